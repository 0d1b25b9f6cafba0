#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;
use todo_manager::{
    auth::{Caller, PasswordHasher},
    config::ManagerConfig,
    db::models::{NewTodo, NewUser, Priority, TaskDto, User},
    AppState,
};

pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> anyhow::Result<String> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, digest: &str) -> anyhow::Result<bool> {
        Ok(digest.strip_prefix("plain$") == Some(password))
    }
}

pub fn test_app() -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let config = ManagerConfig::default().with_database_path(dir.path().join("todo.sqlite3"));
    let app = AppState::with_hasher(&config, Arc::new(PlainHasher)).unwrap();
    (dir, app)
}

pub fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.into(),
        password: "secret".into(),
        first_name: "Grace".into(),
        last_name: "Hopper".into(),
    }
}

pub fn new_todo(title: &str) -> NewTodo {
    NewTodo {
        title: title.into(),
        owner_id: 0,
    }
}

pub fn task_for(todo_id: i64, name: &str) -> TaskDto {
    TaskDto {
        id: 0,
        name: name.into(),
        priority: Priority::High,
        todo_id,
        state_id: 0,
    }
}

/// Registers `email` and returns the record plus its resolved caller.
pub async fn signed_up(app: &AppState, email: &str) -> (User, Caller) {
    let user = app.users.create(Some(new_user(email))).await.unwrap();
    let caller = app.users.resolve_caller(email).await.unwrap();
    (user, caller)
}

pub async fn admin(app: &AppState) -> Caller {
    app.users
        .create_admin(Some(new_user("root@example.com")))
        .await
        .unwrap();
    app.users.resolve_caller("root@example.com").await.unwrap()
}
