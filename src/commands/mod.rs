//! Caller-facing entry points.
//!
//! Every function here evaluates the access policy before it reads a
//! protected record or mutates anything. A non-admin caller aiming at a record
//! that does not exist gets `Forbidden`, the same answer as for a record it may
//! not touch; admins get `NotFound`.

pub mod tasks;
pub mod todos;
pub mod users;

use crate::{
    auth::Caller,
    db::models::TodoAccess,
    error::{EntityKind, ServiceError, ServiceResult},
    log_warn, AppState,
};

const ENABLE_LOGS: bool = true;

/// Failure for a lookup that found nothing, shaped by who asked.
fn missing(caller: &Caller, entity: EntityKind, id: i64) -> ServiceError {
    if caller.is_admin() {
        ServiceError::not_found(entity, id)
    } else {
        log_warn!("Denied access to unknown {entity} for {}", caller.email);
        ServiceError::Forbidden
    }
}

async fn todo_access(state: &AppState, caller: &Caller, todo_id: i64) -> ServiceResult<TodoAccess> {
    state
        .todos
        .access(todo_id)
        .await?
        .ok_or_else(|| missing(caller, EntityKind::Todo, todo_id))
}

/// Access facts of the ToDo that currently holds `task_id`.
async fn task_parent_access(
    state: &AppState,
    caller: &Caller,
    task_id: i64,
) -> ServiceResult<TodoAccess> {
    let parent_id = state
        .tasks
        .parent_of(task_id)
        .await?
        .ok_or_else(|| missing(caller, EntityKind::Task, task_id))?;
    todo_access(state, caller, parent_id).await
}

async fn user_email(state: &AppState, caller: &Caller, user_id: i64) -> ServiceResult<String> {
    match state.users.read_by_id(user_id).await {
        Ok(user) => Ok(user.email),
        Err(ServiceError::NotFound { .. }) => Err(missing(caller, EntityKind::User, user_id)),
        Err(err) => Err(err),
    }
}
