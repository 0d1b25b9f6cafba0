//! User records and the payloads used to create or change them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role_id: i64,
}

/// Registration or admin-created account. The password is plaintext and is
/// hashed before it reaches the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Edit of an existing account.
///
/// `password` is only re-hashed when it carries a new plaintext. `None`, an
/// empty string, or the stored digest echoed back all keep the current hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub id: i64,
    pub email: String,
    pub password: Option<String>,
    pub first_name: String,
    pub last_name: String,
}
