pub mod access;
pub mod auth;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
mod utils;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::Result;

use auth::{Argon2Hasher, PasswordHasher};
use config::ManagerConfig;
use db::Database;
use services::{RoleRegistry, StateRegistry, TaskService, TodoService, UserDirectory};

pub use error::{ServiceError, ServiceResult};
pub use utils::logging::init_logging;

/// Everything a command needs: the store plus the services built on it.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub hasher: Arc<dyn PasswordHasher>,
    pub roles: RoleRegistry,
    pub states: StateRegistry,
    pub users: UserDirectory,
    pub todos: TodoService,
    pub tasks: TaskService,
}

impl AppState {
    /// Opens (and migrates) the database named in `config`, hashing
    /// passwords with Argon2id.
    pub fn open(config: &ManagerConfig) -> Result<Self> {
        Self::with_hasher(config, Arc::new(Argon2Hasher::new()))
    }

    pub fn with_hasher(config: &ManagerConfig, hasher: Arc<dyn PasswordHasher>) -> Result<Self> {
        let db = Database::new(config.database_path.clone())?;

        Ok(Self {
            roles: RoleRegistry::new(db.clone(), config.default_role.clone()),
            states: StateRegistry::new(db.clone(), config.default_state.clone()),
            users: UserDirectory::new(db.clone(), Arc::clone(&hasher), config.default_role.clone()),
            todos: TodoService::new(db.clone()),
            tasks: TaskService::new(db.clone(), config.default_state.clone()),
            hasher,
            db,
        })
    }
}
