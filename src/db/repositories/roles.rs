use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::Role;

fn row_to_role(row: &Row) -> rusqlite::Result<Role> {
    Ok(Role {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}

pub struct RoleRepository<'a> {
    conn: &'a Connection,
}

impl<'a> RoleRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, name: &str) -> Result<Role> {
        self.conn
            .execute("INSERT INTO roles (name) VALUES (?1)", params![name])
            .context("failed to insert role")?;
        Ok(Role {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn save(&self, role: &Role) -> Result<Role> {
        self.conn
            .execute(
                "UPDATE roles SET name = ?1 WHERE id = ?2",
                params![role.name, role.id],
            )
            .context("failed to update role")?;
        Ok(role.clone())
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Role>> {
        self.conn
            .query_row(
                "SELECT id, name FROM roles WHERE id = ?1",
                params![id],
                row_to_role,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        self.conn
            .query_row(
                "SELECT id, name FROM roles WHERE name = ?1",
                params![name],
                row_to_role,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn find_all(&self) -> Result<Vec<Role>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM roles ORDER BY id ASC")?;
        let roles = stmt
            .query_map([], row_to_role)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(roles)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM roles WHERE id = ?1", params![id])
            .context("failed to delete role")?;
        Ok(())
    }

    /// Number of users currently holding the role.
    pub fn count_with_role(&self, id: i64) -> Result<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE role_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
