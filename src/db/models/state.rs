use serde::{Deserialize, Serialize};

/// Lifecycle label of a task ("New", "In Progress", "Done", ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub id: i64,
    pub name: String,
}
