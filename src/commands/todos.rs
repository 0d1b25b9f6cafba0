use crate::{
    access::{ensure, Action, Resource},
    auth::Caller,
    db::models::{NewTodo, Task, Todo, TodoAccess},
    error::{require, EntityKind, ServiceResult},
    AppState,
};

use super::{todo_access, user_email};

/// Creates a ToDo owned by `owner_id`; the payload cannot pick another owner.
pub async fn create_todo(
    state: &AppState,
    caller: &Caller,
    owner_id: i64,
    todo: Option<NewTodo>,
) -> ServiceResult<Todo> {
    let owner_email = user_email(state, caller, owner_id).await?;
    let access = TodoAccess::for_owner(owner_email);
    ensure(caller, &Resource::Todo(&access), Action::Create)?;

    let mut todo = require(todo, EntityKind::Todo)?;
    todo.owner_id = owner_id;
    state.todos.create(Some(todo)).await
}

pub async fn read_todo(state: &AppState, caller: &Caller, todo_id: i64) -> ServiceResult<Todo> {
    let access = todo_access(state, caller, todo_id).await?;
    ensure(caller, &Resource::Todo(&access), Action::Read)?;
    state.todos.read_by_id(todo_id).await
}

pub async fn list_tasks_of_todo(
    state: &AppState,
    caller: &Caller,
    todo_id: i64,
) -> ServiceResult<Vec<Task>> {
    let access = todo_access(state, caller, todo_id).await?;
    ensure(caller, &Resource::Todo(&access), Action::Read)?;
    state.tasks.get_by_todo_id(todo_id).await
}

pub async fn update_todo(
    state: &AppState,
    caller: &Caller,
    todo_id: i64,
    todo: Option<Todo>,
) -> ServiceResult<Todo> {
    let access = todo_access(state, caller, todo_id).await?;
    ensure(caller, &Resource::Todo(&access), Action::Update)?;

    let mut todo = require(todo, EntityKind::Todo)?;
    todo.id = todo_id;
    state.todos.update(Some(todo)).await
}

pub async fn delete_todo(state: &AppState, caller: &Caller, todo_id: i64) -> ServiceResult<()> {
    let access = todo_access(state, caller, todo_id).await?;
    ensure(caller, &Resource::Todo(&access), Action::Delete)?;
    state.todos.delete(todo_id).await
}

/// ToDos `user_id` owns or collaborates on. Visible to that user and admins.
pub async fn list_todos_of_user(
    state: &AppState,
    caller: &Caller,
    user_id: i64,
) -> ServiceResult<Vec<Todo>> {
    let email = user_email(state, caller, user_id).await?;
    ensure(caller, &Resource::User { email: &email }, Action::Read)?;
    state.todos.get_by_user_id(user_id).await
}

pub async fn add_collaborator(
    state: &AppState,
    caller: &Caller,
    todo_id: i64,
    user_id: i64,
) -> ServiceResult<Todo> {
    let access = todo_access(state, caller, todo_id).await?;
    ensure(caller, &Resource::Todo(&access), Action::Update)?;
    state.todos.add_collaborator(todo_id, user_id).await
}

pub async fn remove_collaborator(
    state: &AppState,
    caller: &Caller,
    todo_id: i64,
    user_id: i64,
) -> ServiceResult<Todo> {
    let access = todo_access(state, caller, todo_id).await?;
    ensure(caller, &Resource::Todo(&access), Action::Update)?;
    state.todos.remove_collaborator(todo_id, user_id).await
}
