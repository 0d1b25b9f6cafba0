use serde::{Deserialize, Serialize};

use crate::db::models::ADMIN_ROLE;

/// The authenticated principal on whose behalf an operation runs.
///
/// Passed explicitly into every command instead of being read from
/// process-wide state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    pub user_id: i64,
    pub email: String,
    pub role: String,
}

impl Caller {
    pub fn new(user_id: i64, email: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            role: role.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}
