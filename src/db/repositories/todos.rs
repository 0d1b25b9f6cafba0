use std::collections::BTreeSet;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{
    helpers::parse_datetime,
    models::{Todo, TodoAccess},
};

/// Columns of a `todos` row before the collaborator set is attached.
struct TodoRow {
    id: i64,
    title: String,
    created_at: String,
    owner_id: i64,
}

fn read_todo_row(row: &Row) -> rusqlite::Result<TodoRow> {
    Ok(TodoRow {
        id: row.get("id")?,
        title: row.get("title")?,
        created_at: row.get("created_at")?,
        owner_id: row.get("owner_id")?,
    })
}

pub struct TodoRepository<'a> {
    conn: &'a Connection,
}

impl<'a> TodoRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a ToDo together with its collaborator rows.
    pub fn insert(&self, todo: &Todo) -> Result<Todo> {
        self.conn
            .execute(
                "INSERT INTO todos (title, created_at, owner_id) VALUES (?1, ?2, ?3)",
                params![todo.title, todo.created_at.to_rfc3339(), todo.owner_id],
            )
            .context("failed to insert todo")?;

        let stored = Todo {
            id: self.conn.last_insert_rowid(),
            ..todo.clone()
        };
        self.replace_collaborators(stored.id, &stored.collaborators)?;
        Ok(stored)
    }

    /// Persist every column of an existing ToDo, collaborator set included.
    pub fn save(&self, todo: &Todo) -> Result<Todo> {
        self.conn
            .execute(
                "UPDATE todos
                 SET title = ?1,
                     created_at = ?2,
                     owner_id = ?3
                 WHERE id = ?4",
                params![
                    todo.title,
                    todo.created_at.to_rfc3339(),
                    todo.owner_id,
                    todo.id,
                ],
            )
            .context("failed to update todo")?;
        self.replace_collaborators(todo.id, &todo.collaborators)?;
        Ok(todo.clone())
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Todo>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, title, created_at, owner_id FROM todos WHERE id = ?1",
                params![id],
                read_todo_row,
            )
            .optional()?;

        row.map(|row| self.hydrate(row)).transpose()
    }

    pub fn find_all(&self) -> Result<Vec<Todo>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, created_at, owner_id FROM todos ORDER BY id ASC")?;
        let rows = stmt
            .query_map([], read_todo_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(|row| self.hydrate(row)).collect()
    }

    /// ToDos the user owns or collaborates on.
    pub fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Todo>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, created_at, owner_id
             FROM todos
             WHERE owner_id = ?1
                OR id IN (SELECT todo_id FROM todo_collaborators WHERE user_id = ?1)
             ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![user_id], read_todo_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(|row| self.hydrate(row)).collect()
    }

    /// Tasks and collaborator rows go with the ToDo via `ON DELETE CASCADE`.
    pub fn delete(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM todos WHERE id = ?1", params![id])
            .context("failed to delete todo")?;
        Ok(())
    }

    /// Owner and collaborator emails, for access decisions.
    pub fn find_access(&self, id: i64) -> Result<Option<TodoAccess>> {
        let owner_email: Option<String> = self
            .conn
            .query_row(
                "SELECT u.email
                 FROM todos t
                 JOIN users u ON u.id = t.owner_id
                 WHERE t.id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(owner_email) = owner_email else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT u.email
             FROM todo_collaborators c
             JOIN users u ON u.id = c.user_id
             WHERE c.todo_id = ?1",
        )?;
        let collaborator_emails = stmt
            .query_map(params![id], |row| row.get::<_, String>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Some(TodoAccess {
            owner_email,
            collaborator_emails,
        }))
    }

    fn collaborators_of(&self, todo_id: i64) -> Result<BTreeSet<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id FROM todo_collaborators WHERE todo_id = ?1")?;
        let ids = stmt
            .query_map(params![todo_id], |row| row.get::<_, i64>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(ids)
    }

    fn replace_collaborators(&self, todo_id: i64, collaborators: &BTreeSet<i64>) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM todo_collaborators WHERE todo_id = ?1",
                params![todo_id],
            )
            .context("failed to clear collaborators")?;

        let mut stmt = self
            .conn
            .prepare("INSERT INTO todo_collaborators (todo_id, user_id) VALUES (?1, ?2)")?;
        for &user_id in collaborators {
            stmt.execute(params![todo_id, user_id])
                .with_context(|| format!("failed to add collaborator {user_id}"))?;
        }
        Ok(())
    }

    fn hydrate(&self, row: TodoRow) -> Result<Todo> {
        Ok(Todo {
            id: row.id,
            title: row.title,
            created_at: parse_datetime(&row.created_at, "created_at")?,
            owner_id: row.owner_id,
            collaborators: self.collaborators_of(row.id)?,
        })
    }
}
