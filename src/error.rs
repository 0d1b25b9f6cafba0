//! Error taxonomy shared by the services and commands.
//!
//! Storage code keeps using `anyhow` for context-rich failures; everything a
//! caller can act on is one of the explicit variants below.

use std::fmt;

use thiserror::Error;

/// The persisted entity a lookup was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Role,
    State,
    Todo,
    Task,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Role => "Role",
            EntityKind::State => "State",
            EntityKind::Todo => "ToDo",
            EntityKind::Task => "Task",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The key that had no matching record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    Id(i64),
    Name(String),
    Email(String),
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKey::Id(id) => write!(f, "id '{id}'"),
            LookupKey::Name(name) => write!(f, "name '{name}'"),
            LookupKey::Email(email) => write!(f, "email '{email}'"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required input was absent or blank.
    #[error("{0}")]
    Validation(String),

    #[error("{entity} with {key} not found")]
    NotFound { entity: EntityKind, key: LookupKey },

    /// The caller is not allowed to perform the requested action.
    #[error("access denied")]
    Forbidden,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ServiceError {
    /// Error for an absent payload, e.g. `ToDo cannot be empty`.
    pub fn missing(entity: EntityKind) -> Self {
        ServiceError::Validation(format!("{entity} cannot be empty"))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn not_found(entity: EntityKind, id: i64) -> Self {
        ServiceError::NotFound {
            entity,
            key: LookupKey::Id(id),
        }
    }

    pub fn not_found_by_name(entity: EntityKind, name: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity,
            key: LookupKey::Name(name.into()),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, ServiceError::Forbidden)
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(err: rusqlite::Error) -> Self {
        ServiceError::Storage(anyhow::Error::new(err))
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Unwraps a required payload or fails with a validation error.
pub fn require<T>(payload: Option<T>, entity: EntityKind) -> ServiceResult<T> {
    payload.ok_or_else(|| ServiceError::missing(entity))
}

/// Rejects empty or whitespace-only text for a required field.
pub fn require_text(value: &str, field: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::invalid(format!("{field} must not be blank")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_key() {
        let err = ServiceError::not_found(EntityKind::Todo, 7);
        assert_eq!(err.to_string(), "ToDo with id '7' not found");

        let err = ServiceError::not_found_by_name(EntityKind::State, "New");
        assert_eq!(err.to_string(), "State with name 'New' not found");
    }

    #[test]
    fn missing_payload_is_validation() {
        let err = require::<()>(None, EntityKind::Task).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Task cannot be empty");
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("  ", "title").unwrap_err().is_validation());
        assert!(require_text("Groceries", "title").is_ok());
    }

    #[test]
    fn forbidden_is_not_not_found() {
        let err = ServiceError::Forbidden;
        assert!(err.is_forbidden());
        assert!(!err.is_not_found());
    }
}
