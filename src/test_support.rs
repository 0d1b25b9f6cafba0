use std::sync::Arc;

use anyhow::Result;
use tempfile::TempDir;

use crate::{
    auth::PasswordHasher,
    config::ManagerConfig,
    db::models::NewUser,
    AppState,
};

/// Reversible stand-in for Argon2 so service tests stay fast.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, digest: &str) -> Result<bool> {
        Ok(digest.strip_prefix("plain$") == Some(password))
    }
}

/// Fresh database in its own temp directory. Keep the `TempDir` alive for
/// the duration of the test.
pub fn test_app() -> (TempDir, AppState) {
    test_app_with(Arc::new(PlainHasher))
}

pub fn test_app_with(hasher: Arc<dyn PasswordHasher>) -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let config = ManagerConfig::default().with_database_path(dir.path().join("test.sqlite3"));
    let app = AppState::with_hasher(&config, hasher).unwrap();
    (dir, app)
}

pub fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.into(),
        password: "secret".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
    }
}
