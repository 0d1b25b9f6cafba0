use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::State;

fn row_to_state(row: &Row) -> rusqlite::Result<State> {
    Ok(State {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}

pub struct StateRepository<'a> {
    conn: &'a Connection,
}

impl<'a> StateRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, name: &str) -> Result<State> {
        self.conn
            .execute("INSERT INTO states (name) VALUES (?1)", params![name])
            .context("failed to insert state")?;
        Ok(State {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn save(&self, state: &State) -> Result<State> {
        self.conn
            .execute(
                "UPDATE states SET name = ?1 WHERE id = ?2",
                params![state.name, state.id],
            )
            .context("failed to update state")?;
        Ok(state.clone())
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<State>> {
        self.conn
            .query_row(
                "SELECT id, name FROM states WHERE id = ?1",
                params![id],
                row_to_state,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<State>> {
        self.conn
            .query_row(
                "SELECT id, name FROM states WHERE name = ?1",
                params![name],
                row_to_state,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn find_all(&self) -> Result<Vec<State>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM states ORDER BY id ASC")?;
        let states = stmt
            .query_map([], row_to_state)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(states)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM states WHERE id = ?1", params![id])
            .context("failed to delete state")?;
        Ok(())
    }

    /// Number of tasks currently in the state.
    pub fn count_with_state(&self, id: i64) -> Result<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM tasks WHERE state_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
