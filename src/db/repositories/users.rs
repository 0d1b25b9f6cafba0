use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::User;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, role_id";

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        role_id: row.get("role_id")?,
    })
}

pub struct UserRepository<'a> {
    conn: &'a Connection,
}

impl<'a> UserRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new user; `user.id` is ignored and replaced by the generated id.
    pub fn insert(&self, user: &User) -> Result<User> {
        self.conn
            .execute(
                "INSERT INTO users (email, password_hash, first_name, last_name, role_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.email,
                    user.password_hash,
                    user.first_name,
                    user.last_name,
                    user.role_id,
                ],
            )
            .context("failed to insert user")?;

        Ok(User {
            id: self.conn.last_insert_rowid(),
            ..user.clone()
        })
    }

    pub fn save(&self, user: &User) -> Result<User> {
        self.conn
            .execute(
                "UPDATE users
                 SET email = ?1,
                     password_hash = ?2,
                     first_name = ?3,
                     last_name = ?4,
                     role_id = ?5
                 WHERE id = ?6",
                params![
                    user.email,
                    user.password_hash,
                    user.first_name,
                    user.last_name,
                    user.role_id,
                    user.id,
                ],
            )
            .context("failed to update user")?;
        Ok(user.clone())
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                row_to_user,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                row_to_user,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn find_all(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"))?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Deleting a user cascades to the ToDos it owns and its collaborator rows.
    pub fn delete(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM users WHERE id = ?1", params![id])
            .context("failed to delete user")?;
        Ok(())
    }
}
