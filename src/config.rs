use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ManagerConfig {
    /// SQLite file backing the entity store.
    pub database_path: PathBuf,
    /// Role given to every newly created account.
    pub default_role: String,
    /// State every new task starts in.
    pub default_state: String,
    /// Fallback when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("todo-manager.sqlite3"),
            default_role: "USER".into(),
            default_state: "New".into(),
            log_level: "info".into(),
        }
    }
}

impl ManagerConfig {
    /// Reads a JSON config file. A missing file yields the defaults; fields
    /// absent from the file keep their default values.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ManagerConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ManagerConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "defaultState": "Backlog", "logLevel": "debug" }"#).unwrap();

        let config = ManagerConfig::load(&path).unwrap();
        assert_eq!(config.default_state, "Backlog");
        assert_eq!(config.default_role, "USER");
        assert_eq!(config.log_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(ManagerConfig::load(&path).is_err());
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let config = ManagerConfig {
            log_level: "chatty".into(),
            ..ManagerConfig::default()
        };
        assert_eq!(config.log_filter(), log::LevelFilter::Info);
    }
}
