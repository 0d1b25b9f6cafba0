//! ToDo collections and their sharing metadata.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A to-do collection owned by one user and shared with a set of collaborators.
///
/// `owner_id`, `collaborators` and `created_at` are never taken from an
/// update payload; they only change through their dedicated operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub owner_id: i64,
    pub collaborators: BTreeSet<i64>,
}

impl Todo {
    pub fn is_collaborator(&self, user_id: i64) -> bool {
        self.collaborators.contains(&user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: String,
    pub owner_id: i64,
}

/// The identity facts the access policy needs about a ToDo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoAccess {
    pub owner_email: String,
    pub collaborator_emails: BTreeSet<String>,
}

impl TodoAccess {
    /// Access facts for a ToDo that is about to be created for `owner_email`.
    pub fn for_owner(owner_email: impl Into<String>) -> Self {
        Self {
            owner_email: owner_email.into(),
            collaborator_emails: BTreeSet::new(),
        }
    }
}
