use crate::{
    access::{ensure, Action, Resource},
    auth::Caller,
    db::models::{Task, TaskDto},
    error::{require, EntityKind, ServiceResult},
    AppState,
};

use super::{task_parent_access, todo_access};

/// Adds a task to `dto.todo_id`; only that ToDo's owner (or an admin) may.
pub async fn create_task(
    state: &AppState,
    caller: &Caller,
    dto: Option<TaskDto>,
) -> ServiceResult<Task> {
    let dto = require(dto, EntityKind::Task)?;
    let parent = todo_access(state, caller, dto.todo_id).await?;
    ensure(caller, &Resource::Task { parent: &parent }, Action::Create)?;
    state.tasks.create(Some(dto)).await
}

pub async fn read_task(state: &AppState, caller: &Caller, task_id: i64) -> ServiceResult<Task> {
    let parent = task_parent_access(state, caller, task_id).await?;
    ensure(caller, &Resource::Task { parent: &parent }, Action::Read)?;
    state.tasks.read_by_id(task_id).await
}

/// Authorized against the ToDo the task is stored under, never against the
/// ToDo named in the payload. That ToDo must still exist, and an unknown id
/// there is `Forbidden` for non-admins like any other missing record.
pub async fn update_task(
    state: &AppState,
    caller: &Caller,
    task_id: i64,
    dto: Option<TaskDto>,
) -> ServiceResult<Task> {
    let parent = task_parent_access(state, caller, task_id).await?;
    ensure(caller, &Resource::Task { parent: &parent }, Action::Update)?;

    let mut dto = require(dto, EntityKind::Task)?;
    todo_access(state, caller, dto.todo_id).await?;
    dto.id = task_id;
    state.tasks.update(Some(dto)).await
}

pub async fn delete_task(state: &AppState, caller: &Caller, task_id: i64) -> ServiceResult<()> {
    let parent = task_parent_access(state, caller, task_id).await?;
    ensure(caller, &Resource::Task { parent: &parent }, Action::Delete)?;
    state.tasks.delete(task_id).await
}
