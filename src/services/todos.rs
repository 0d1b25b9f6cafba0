use std::collections::BTreeSet;

use chrono::Utc;

use crate::{
    db::{
        models::{NewTodo, Todo, TodoAccess},
        repositories::{TodoRepository, UserRepository},
        Database,
    },
    error::{require, require_text, EntityKind, ServiceError, ServiceResult},
    log_info,
};

const ENABLE_LOGS: bool = true;

/// Lifecycle of ToDo collections, their owner and their collaborator set.
#[derive(Clone)]
pub struct TodoService {
    db: Database,
}

impl TodoService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Stores a new ToDo for `todo.owner_id`, stamped with the current time.
    pub async fn create(&self, todo: Option<NewTodo>) -> ServiceResult<Todo> {
        let todo = require(todo, EntityKind::Todo)?;
        require_text(&todo.title, "title")?;

        let created = self
            .db
            .transact(move |tx| {
                if UserRepository::new(tx).find_by_id(todo.owner_id)?.is_none() {
                    return Err(ServiceError::not_found(EntityKind::User, todo.owner_id));
                }

                let record = Todo {
                    id: 0,
                    title: todo.title,
                    created_at: Utc::now(),
                    owner_id: todo.owner_id,
                    collaborators: BTreeSet::new(),
                };
                Ok(TodoRepository::new(tx).insert(&record)?)
            })
            .await?;

        log_info!("Created ToDo {} for user {}", created.id, created.owner_id);
        Ok(created)
    }

    pub async fn read_by_id(&self, id: i64) -> ServiceResult<Todo> {
        self.db
            .transact(move |tx| {
                TodoRepository::new(tx)
                    .find_by_id(id)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::Todo, id))
            })
            .await
    }

    /// Persists the mutable fields of `todo`.
    ///
    /// Owner, collaborators and creation time are copied from the stored
    /// record; whatever the payload carries for them is discarded.
    pub async fn update(&self, todo: Option<Todo>) -> ServiceResult<Todo> {
        let mut todo = require(todo, EntityKind::Todo)?;
        require_text(&todo.title, "title")?;

        let updated = self
            .db
            .transact(move |tx| {
                let repo = TodoRepository::new(tx);
                let stored = repo
                    .find_by_id(todo.id)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::Todo, todo.id))?;

                todo.owner_id = stored.owner_id;
                todo.collaborators = stored.collaborators;
                todo.created_at = stored.created_at;
                Ok(repo.save(&todo)?)
            })
            .await?;

        log_info!("Updated ToDo {}", updated.id);
        Ok(updated)
    }

    /// Removes the ToDo; its tasks and collaborator links go with it.
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.db
            .transact(move |tx| {
                let repo = TodoRepository::new(tx);
                if repo.find_by_id(id)?.is_none() {
                    return Err(ServiceError::not_found(EntityKind::Todo, id));
                }
                Ok(repo.delete(id)?)
            })
            .await?;

        log_info!("Deleted ToDo {id}");
        Ok(())
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<Todo>> {
        self.db
            .transact(|tx| Ok(TodoRepository::new(tx).find_all()?))
            .await
    }

    /// ToDos the user owns or collaborates on.
    pub async fn get_by_user_id(&self, user_id: i64) -> ServiceResult<Vec<Todo>> {
        self.db
            .transact(move |tx| Ok(TodoRepository::new(tx).find_by_user_id(user_id)?))
            .await
    }

    /// Shares the ToDo with `user_id`. Adding an existing collaborator is a
    /// no-op; the owner cannot be added.
    pub async fn add_collaborator(&self, todo_id: i64, user_id: i64) -> ServiceResult<Todo> {
        let updated = self
            .edit_collaborators(todo_id, user_id, move |todo| {
                if todo.owner_id == user_id {
                    return Err(ServiceError::invalid(
                        "the owner of a ToDo cannot be its collaborator",
                    ));
                }
                todo.collaborators.insert(user_id);
                Ok(())
            })
            .await?;

        log_info!("Added collaborator {user_id} to ToDo {todo_id}");
        Ok(updated)
    }

    /// Stops sharing the ToDo with `user_id`; a non-member is left as is.
    pub async fn remove_collaborator(&self, todo_id: i64, user_id: i64) -> ServiceResult<Todo> {
        let updated = self
            .edit_collaborators(todo_id, user_id, move |todo| {
                todo.collaborators.remove(&user_id);
                Ok(())
            })
            .await?;

        log_info!("Removed collaborator {user_id} from ToDo {todo_id}");
        Ok(updated)
    }

    /// Owner and collaborator emails of a ToDo, or `None` if it does not exist.
    pub async fn access(&self, id: i64) -> ServiceResult<Option<TodoAccess>> {
        self.db
            .transact(move |tx| Ok(TodoRepository::new(tx).find_access(id)?))
            .await
    }

    async fn edit_collaborators<F>(&self, todo_id: i64, user_id: i64, edit: F) -> ServiceResult<Todo>
    where
        F: FnOnce(&mut Todo) -> ServiceResult<()> + Send + 'static,
    {
        self.db
            .transact(move |tx| {
                let repo = TodoRepository::new(tx);
                let mut todo = repo
                    .find_by_id(todo_id)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::Todo, todo_id))?;
                if UserRepository::new(tx).find_by_id(user_id)?.is_none() {
                    return Err(ServiceError::not_found(EntityKind::User, user_id));
                }

                edit(&mut todo)?;
                Ok(repo.save(&todo)?)
            })
            .await
    }
}
