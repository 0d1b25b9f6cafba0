use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{helpers::parse_priority, models::Task};

fn row_to_task(row: &Row) -> Result<Task> {
    let priority: String = row.get("priority")?;

    Ok(Task {
        id: row.get("id")?,
        name: row.get("name")?,
        priority: parse_priority(&priority)?,
        state_id: row.get("state_id")?,
        todo_id: row.get("todo_id")?,
    })
}

pub struct TaskRepository<'a> {
    conn: &'a Connection,
}

impl<'a> TaskRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, task: &Task) -> Result<Task> {
        self.conn
            .execute(
                "INSERT INTO tasks (name, priority, state_id, todo_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    task.name,
                    task.priority.as_str(),
                    task.state_id,
                    task.todo_id,
                ],
            )
            .context("failed to insert task")?;

        Ok(Task {
            id: self.conn.last_insert_rowid(),
            ..task.clone()
        })
    }

    pub fn save(&self, task: &Task) -> Result<Task> {
        self.conn
            .execute(
                "UPDATE tasks
                 SET name = ?1,
                     priority = ?2,
                     state_id = ?3,
                     todo_id = ?4
                 WHERE id = ?5",
                params![
                    task.name,
                    task.priority.as_str(),
                    task.state_id,
                    task.todo_id,
                    task.id,
                ],
            )
            .context("failed to update task")?;
        Ok(task.clone())
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, priority, state_id, todo_id
             FROM tasks
             WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_task(row)?)),
            None => Ok(None),
        }
    }

    pub fn find_all(&self) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, priority, state_id, todo_id
             FROM tasks
             ORDER BY id ASC",
        )?;

        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(row_to_task(row)?);
        }
        Ok(tasks)
    }

    pub fn find_by_todo_id(&self, todo_id: i64) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, priority, state_id, todo_id
             FROM tasks
             WHERE todo_id = ?1
             ORDER BY id ASC",
        )?;

        let mut rows = stmt.query(params![todo_id])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(row_to_task(row)?);
        }
        Ok(tasks)
    }

    /// Parent ToDo of a stored task, without loading the task itself.
    pub fn find_parent_id(&self, id: i64) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT todo_id FROM tasks WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])
            .context("failed to delete task")?;
        Ok(())
    }
}
