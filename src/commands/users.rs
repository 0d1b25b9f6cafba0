use crate::{
    access::{ensure, Action, Resource},
    auth::Caller,
    db::models::{NewUser, User, UserUpdate},
    error::{require, EntityKind, ServiceResult},
    AppState,
};

use super::user_email;

/// Self-registration. Needs no caller; the account gets the default role.
pub async fn register(state: &AppState, user: Option<NewUser>) -> ServiceResult<User> {
    state.users.create(user).await
}

pub async fn create_user(
    state: &AppState,
    caller: &Caller,
    user: Option<NewUser>,
) -> ServiceResult<User> {
    ensure(caller, &Resource::UserDirectory, Action::Create)?;
    state.users.create(user).await
}

pub async fn read_user(state: &AppState, caller: &Caller, user_id: i64) -> ServiceResult<User> {
    let email = user_email(state, caller, user_id).await?;
    ensure(caller, &Resource::User { email: &email }, Action::Read)?;
    state.users.read_by_id(user_id).await
}

/// Edits account `user_id`. The payload's own `id` is replaced by `user_id`,
/// so the record that was authorized is the record that changes.
pub async fn update_user(
    state: &AppState,
    caller: &Caller,
    user_id: i64,
    role_id: i64,
    user: Option<UserUpdate>,
) -> ServiceResult<User> {
    let email = user_email(state, caller, user_id).await?;
    ensure(caller, &Resource::User { email: &email }, Action::Update)?;

    let mut user = require(user, EntityKind::User)?;
    user.id = user_id;
    state.users.update(caller, role_id, Some(user)).await
}

pub async fn delete_user(state: &AppState, caller: &Caller, user_id: i64) -> ServiceResult<()> {
    ensure(caller, &Resource::UserDirectory, Action::Delete)?;
    state.users.delete(user_id).await
}

pub async fn list_users(state: &AppState, caller: &Caller) -> ServiceResult<Vec<User>> {
    ensure(caller, &Resource::UserDirectory, Action::Read)?;
    state.users.get_all().await
}
