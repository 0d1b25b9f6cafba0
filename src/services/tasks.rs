use crate::{
    db::{
        models::{Task, TaskDto},
        repositories::{StateRepository, TaskRepository, TodoRepository},
        Database,
    },
    error::{require, require_text, EntityKind, ServiceError, ServiceResult},
    log_info,
};

const ENABLE_LOGS: bool = true;

#[derive(Clone)]
pub struct TaskService {
    db: Database,
    default_state: String,
}

impl TaskService {
    pub fn new(db: Database, default_state: String) -> Self {
        Self { db, default_state }
    }

    /// Adds a task under `dto.todo_id`. The task always starts in the default
    /// state; `dto.state_id` and `dto.id` are ignored.
    pub async fn create(&self, dto: Option<TaskDto>) -> ServiceResult<Task> {
        let dto = require(dto, EntityKind::Task)?;
        require_text(&dto.name, "task name")?;
        let default_state = self.default_state.clone();

        let created = self
            .db
            .transact(move |tx| {
                if TodoRepository::new(tx).find_by_id(dto.todo_id)?.is_none() {
                    return Err(ServiceError::not_found(EntityKind::Todo, dto.todo_id));
                }
                let state = StateRepository::new(tx)
                    .find_by_name(&default_state)?
                    .ok_or_else(|| {
                        ServiceError::not_found_by_name(EntityKind::State, default_state.clone())
                    })?;

                let record = Task {
                    id: 0,
                    name: dto.name,
                    priority: dto.priority,
                    state_id: state.id,
                    todo_id: dto.todo_id,
                };
                Ok(TaskRepository::new(tx).insert(&record)?)
            })
            .await?;

        log_info!("Created task {} in ToDo {}", created.id, created.todo_id);
        Ok(created)
    }

    pub async fn read_by_id(&self, id: i64) -> ServiceResult<Task> {
        self.db
            .transact(move |tx| {
                TaskRepository::new(tx)
                    .find_by_id(id)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::Task, id))
            })
            .await
    }

    /// Applies name, priority and state from `dto`.
    ///
    /// `dto.state_id` and `dto.todo_id` must both resolve, but the task stays
    /// attached to the ToDo it was created under.
    pub async fn update(&self, dto: Option<TaskDto>) -> ServiceResult<Task> {
        let dto = require(dto, EntityKind::Task)?;
        require_text(&dto.name, "task name")?;

        let updated = self
            .db
            .transact(move |tx| {
                let state = StateRepository::new(tx)
                    .find_by_id(dto.state_id)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::State, dto.state_id))?;
                if TodoRepository::new(tx).find_by_id(dto.todo_id)?.is_none() {
                    return Err(ServiceError::not_found(EntityKind::Todo, dto.todo_id));
                }

                let tasks = TaskRepository::new(tx);
                let stored = tasks
                    .find_by_id(dto.id)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::Task, dto.id))?;

                let record = Task {
                    id: stored.id,
                    name: dto.name,
                    priority: dto.priority,
                    state_id: state.id,
                    todo_id: stored.todo_id,
                };
                Ok(tasks.save(&record)?)
            })
            .await?;

        log_info!("Updated task {}", updated.id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.db
            .transact(move |tx| {
                let tasks = TaskRepository::new(tx);
                if tasks.find_by_id(id)?.is_none() {
                    return Err(ServiceError::not_found(EntityKind::Task, id));
                }
                Ok(tasks.delete(id)?)
            })
            .await?;

        log_info!("Deleted task {id}");
        Ok(())
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<Task>> {
        self.db
            .transact(|tx| Ok(TaskRepository::new(tx).find_all()?))
            .await
    }

    pub async fn get_by_todo_id(&self, todo_id: i64) -> ServiceResult<Vec<Task>> {
        self.db
            .transact(move |tx| Ok(TaskRepository::new(tx).find_by_todo_id(todo_id)?))
            .await
    }

    /// Id of the ToDo a stored task belongs to.
    pub async fn parent_of(&self, id: i64) -> ServiceResult<Option<i64>> {
        self.db
            .transact(move |tx| Ok(TaskRepository::new(tx).find_parent_id(id)?))
            .await
    }
}
