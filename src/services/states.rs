use crate::{
    db::{models::State, repositories::StateRepository, Database},
    error::{require, require_text, EntityKind, ServiceError, ServiceResult},
    log_info,
};

const ENABLE_LOGS: bool = true;

/// Reference data: task lifecycle labels, looked up by id or by name.
/// The default state new tasks start in cannot be renamed or deleted.
#[derive(Clone)]
pub struct StateRegistry {
    db: Database,
    default_state: String,
}

impl StateRegistry {
    pub fn new(db: Database, default_state: String) -> Self {
        Self { db, default_state }
    }

    pub async fn create(&self, state: Option<State>) -> ServiceResult<State> {
        let state = require(state, EntityKind::State)?;
        require_text(&state.name, "state name")?;

        let created = self
            .db
            .transact(move |tx| {
                let repo = StateRepository::new(tx);
                if repo.find_by_name(&state.name)?.is_some() {
                    return Err(ServiceError::invalid(format!(
                        "State '{}' already exists",
                        state.name
                    )));
                }
                Ok(repo.insert(&state.name)?)
            })
            .await?;

        log_info!("Created state {} ({})", created.id, created.name);
        Ok(created)
    }

    pub async fn read_by_id(&self, id: i64) -> ServiceResult<State> {
        self.db
            .transact(move |tx| {
                StateRepository::new(tx)
                    .find_by_id(id)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::State, id))
            })
            .await
    }

    pub async fn get_by_name(&self, name: &str) -> ServiceResult<State> {
        let name = name.to_string();
        self.db
            .transact(move |tx| {
                StateRepository::new(tx)
                    .find_by_name(&name)?
                    .ok_or_else(|| ServiceError::not_found_by_name(EntityKind::State, name))
            })
            .await
    }

    pub async fn update(&self, state: Option<State>) -> ServiceResult<State> {
        let state = require(state, EntityKind::State)?;
        require_text(&state.name, "state name")?;
        let default_state = self.default_state.clone();

        let updated = self
            .db
            .transact(move |tx| {
                let repo = StateRepository::new(tx);
                let stored = repo
                    .find_by_id(state.id)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::State, state.id))?;
                if stored.name == state.name {
                    return Ok(stored);
                }
                if stored.name == default_state {
                    return Err(ServiceError::invalid(format!(
                        "State '{}' is the default state and cannot be renamed",
                        stored.name
                    )));
                }
                if repo.find_by_name(&state.name)?.is_some() {
                    return Err(ServiceError::invalid(format!(
                        "State '{}' already exists",
                        state.name
                    )));
                }
                Ok(repo.save(&state)?)
            })
            .await?;

        log_info!("Updated state {}", updated.id);
        Ok(updated)
    }

    /// A state used by any task cannot be removed, nor can the default state.
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let default_state = self.default_state.clone();

        self.db
            .transact(move |tx| {
                let repo = StateRepository::new(tx);
                let state = repo
                    .find_by_id(id)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::State, id))?;
                if state.name == default_state {
                    return Err(ServiceError::invalid(format!(
                        "State '{}' is the default state and cannot be deleted",
                        state.name
                    )));
                }
                if repo.count_with_state(id)? > 0 {
                    return Err(ServiceError::invalid(format!(
                        "State '{}' is still used by tasks",
                        state.name
                    )));
                }
                Ok(repo.delete(id)?)
            })
            .await?;

        log_info!("Deleted state {id}");
        Ok(())
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<State>> {
        self.db
            .transact(|tx| Ok(StateRepository::new(tx).find_all()?))
            .await
    }
}
