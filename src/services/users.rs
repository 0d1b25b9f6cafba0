//! User directory: accounts, their roles and their credentials.

use std::sync::Arc;

use crate::{
    auth::{Caller, PasswordHasher},
    db::{
        models::{NewUser, User, UserUpdate, ADMIN_ROLE},
        repositories::{RoleRepository, UserRepository},
        Database,
    },
    error::{require, require_text, EntityKind, LookupKey, ServiceError, ServiceResult},
    log_info, log_warn,
};

const ENABLE_LOGS: bool = true;

#[derive(Clone)]
pub struct UserDirectory {
    db: Database,
    hasher: Arc<dyn PasswordHasher>,
    default_role: String,
}

impl UserDirectory {
    pub fn new(db: Database, hasher: Arc<dyn PasswordHasher>, default_role: String) -> Self {
        Self {
            db,
            hasher,
            default_role,
        }
    }

    /// Creates an account with the default role, whatever the caller asked for.
    pub async fn create(&self, user: Option<NewUser>) -> ServiceResult<User> {
        let role = self.default_role.clone();
        self.insert_with_role(user, role).await
    }

    /// Creates an `ADMIN` account. Only used when bootstrapping an installation.
    pub async fn create_admin(&self, user: Option<NewUser>) -> ServiceResult<User> {
        self.insert_with_role(user, ADMIN_ROLE.to_string()).await
    }

    async fn insert_with_role(&self, user: Option<NewUser>, role_name: String) -> ServiceResult<User> {
        let user = require(user, EntityKind::User)?;
        require_text(&user.email, "email")?;
        require_text(&user.password, "password")?;

        let password_hash = self.hasher.hash(&user.password)?;

        let created = self
            .db
            .transact(move |tx| {
                let role = RoleRepository::new(tx)
                    .find_by_name(&role_name)?
                    .ok_or_else(|| ServiceError::not_found_by_name(EntityKind::Role, role_name))?;

                let users = UserRepository::new(tx);
                if users.find_by_email(&user.email)?.is_some() {
                    return Err(ServiceError::invalid(format!(
                        "email '{}' is already registered",
                        user.email
                    )));
                }

                let record = User {
                    id: 0,
                    email: user.email,
                    password_hash,
                    first_name: user.first_name,
                    last_name: user.last_name,
                    role_id: role.id,
                };
                Ok(users.insert(&record)?)
            })
            .await?;

        log_info!("Created user {} with role {}", created.id, created.role_id);
        Ok(created)
    }

    pub async fn read_by_id(&self, id: i64) -> ServiceResult<User> {
        self.db
            .transact(move |tx| {
                UserRepository::new(tx)
                    .find_by_id(id)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::User, id))
            })
            .await
    }

    pub async fn read_by_email(&self, email: &str) -> ServiceResult<User> {
        let email = email.to_string();
        self.db
            .transact(move |tx| {
                UserRepository::new(tx)
                    .find_by_email(&email)?
                    .ok_or(ServiceError::NotFound {
                        entity: EntityKind::User,
                        key: LookupKey::Email(email),
                    })
            })
            .await
    }

    /// Applies an account edit.
    ///
    /// The role moves to `role_id` only when `caller` is an admin; anyone else
    /// keeps the stored role no matter what was requested. The password is
    /// re-hashed only when the payload carries a new plaintext.
    pub async fn update(
        &self,
        caller: &Caller,
        role_id: i64,
        user: Option<UserUpdate>,
    ) -> ServiceResult<User> {
        let user = require(user, EntityKind::User)?;
        require_text(&user.email, "email")?;

        let caller_is_admin = caller.is_admin();

        // Hashing stays off the database worker thread.
        let stored_hash = self.read_by_id(user.id).await?.password_hash;
        let new_hash = match user.password.as_deref() {
            Some(plain) if !plain.is_empty() && plain != stored_hash => {
                Some(self.hasher.hash(plain)?)
            }
            _ => None,
        };

        let updated = self
            .db
            .transact(move |tx| {
                let users = UserRepository::new(tx);
                let existing = users
                    .find_by_id(user.id)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::User, user.id))?;

                let role_id = if caller_is_admin {
                    RoleRepository::new(tx)
                        .find_by_id(role_id)?
                        .ok_or_else(|| ServiceError::not_found(EntityKind::Role, role_id))?
                        .id
                } else {
                    existing.role_id
                };

                if user.email != existing.email {
                    if let Some(other) = users.find_by_email(&user.email)? {
                        if other.id != existing.id {
                            return Err(ServiceError::invalid(format!(
                                "email '{}' is already registered",
                                user.email
                            )));
                        }
                    }
                }

                let record = User {
                    id: existing.id,
                    email: user.email,
                    password_hash: new_hash.unwrap_or(existing.password_hash),
                    first_name: user.first_name,
                    last_name: user.last_name,
                    role_id,
                };
                Ok(users.save(&record)?)
            })
            .await?;

        log_info!("Updated user {}", updated.id);
        Ok(updated)
    }

    /// Removes the account together with the ToDos it owns.
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.db
            .transact(move |tx| {
                let users = UserRepository::new(tx);
                if users.find_by_id(id)?.is_none() {
                    return Err(ServiceError::not_found(EntityKind::User, id));
                }
                Ok(users.delete(id)?)
            })
            .await?;

        log_info!("Deleted user {id}");
        Ok(())
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<User>> {
        self.db
            .transact(|tx| Ok(UserRepository::new(tx).find_all()?))
            .await
    }

    /// Identity-provider hook: turns an authenticated email into a [`Caller`]
    /// carrying the account's current role. Unknown emails are `Forbidden`.
    pub async fn resolve_caller(&self, email: &str) -> ServiceResult<Caller> {
        let email = email.to_string();
        self.db
            .transact(move |tx| {
                let Some(user) = UserRepository::new(tx).find_by_email(&email)? else {
                    return Err(ServiceError::Forbidden);
                };
                let role = RoleRepository::new(tx)
                    .find_by_id(user.role_id)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::Role, user.role_id))?;
                Ok(Caller::new(user.id, user.email, role.name))
            })
            .await
    }

    /// Checks credentials and yields the matching [`Caller`]. Unknown
    /// accounts and wrong passwords are indistinguishable.
    pub async fn authenticate(&self, email: &str, password: &str) -> ServiceResult<Caller> {
        let stored = match self.read_by_email(email).await {
            Ok(user) => user,
            Err(ServiceError::NotFound { .. }) => {
                log_warn!("Rejected login for unknown account");
                return Err(ServiceError::Forbidden);
            }
            Err(err) => return Err(err),
        };

        if !self.hasher.verify(password, &stored.password_hash)? {
            log_warn!("Rejected login for user {}", stored.id);
            return Err(ServiceError::Forbidden);
        }

        self.resolve_caller(&stored.email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::connection::WORKER_THREAD_NAME,
        test_support::{new_user, test_app, test_app_with, PlainHasher},
    };

    /// Fails whenever it is asked to hash on the database worker thread.
    struct OffWorkerHasher;

    impl PasswordHasher for OffWorkerHasher {
        fn hash(&self, password: &str) -> anyhow::Result<String> {
            if std::thread::current().name() == Some(WORKER_THREAD_NAME) {
                anyhow::bail!("hashing on the database thread");
            }
            PlainHasher.hash(password)
        }

        fn verify(&self, password: &str, digest: &str) -> anyhow::Result<bool> {
            PlainHasher.verify(password, digest)
        }
    }

    #[tokio::test]
    async fn create_forces_default_role_and_hashes_password() {
        let (_dir, app) = test_app();

        let created = app.users.create(Some(new_user("a@x.com"))).await.unwrap();
        let user_role = app.roles.get_by_name("USER").await.unwrap();

        assert!(created.id > 0);
        assert_eq!(created.role_id, user_role.id);
        assert_ne!(created.password_hash, "secret");
        assert!(app.hasher.verify("secret", &created.password_hash).unwrap());

        let read = app.users.read_by_id(created.id).await.unwrap();
        assert_eq!(read.email, "a@x.com");
        assert_eq!(read.role_id, user_role.id);
    }

    #[tokio::test]
    async fn create_rejects_missing_and_blank_payloads() {
        let (_dir, app) = test_app();

        let err = app.users.create(None).await.unwrap_err();
        assert_eq!(err.to_string(), "User cannot be empty");

        let mut blank = new_user("b@x.com");
        blank.password = "   ".into();
        assert!(app.users.create(Some(blank)).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (_dir, app) = test_app();
        app.users.create(Some(new_user("a@x.com"))).await.unwrap();

        let err = app.users.create(Some(new_user("a@x.com"))).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(app.users.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let (_dir, app) = test_app();

        let err = app.users.read_by_id(42).await.unwrap_err();
        assert_eq!(err.to_string(), "User with id '42' not found");
        assert!(app.users.delete(42).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn get_all_on_empty_store_is_empty() {
        let (_dir, app) = test_app();
        assert!(app.users.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_admin_cannot_change_own_role() {
        let (_dir, app) = test_app();
        let user = app.users.create(Some(new_user("a@x.com"))).await.unwrap();
        let caller = app.users.resolve_caller("a@x.com").await.unwrap();
        let admin_role = app.roles.get_by_name(ADMIN_ROLE).await.unwrap();

        let update = UserUpdate {
            id: user.id,
            email: user.email.clone(),
            password: None,
            first_name: "Renamed".into(),
            last_name: user.last_name.clone(),
        };
        let updated = app
            .users
            .update(&caller, admin_role.id, Some(update))
            .await
            .unwrap();

        assert_eq!(updated.role_id, user.role_id);
        assert_eq!(updated.first_name, "Renamed");
        assert_eq!(app.users.read_by_id(user.id).await.unwrap().role_id, user.role_id);
    }

    #[tokio::test]
    async fn admin_can_reassign_role_but_not_to_unknown_role() {
        let (_dir, app) = test_app();
        let admin = app.users.create_admin(Some(new_user("root@x.com"))).await.unwrap();
        let user = app.users.create(Some(new_user("a@x.com"))).await.unwrap();
        let caller = app.users.resolve_caller("root@x.com").await.unwrap();
        assert!(caller.is_admin());

        let update = UserUpdate {
            id: user.id,
            email: user.email.clone(),
            password: None,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        };
        let promoted = app
            .users
            .update(&caller, admin.role_id, Some(update.clone()))
            .await
            .unwrap();
        assert_eq!(promoted.role_id, admin.role_id);

        let err = app.users.update(&caller, 999, Some(update)).await.unwrap_err();
        assert_eq!(err.to_string(), "Role with id '999' not found");
    }

    #[tokio::test]
    async fn update_keeps_hash_unless_new_password_given() {
        let (_dir, app) = test_app();
        let user = app.users.create(Some(new_user("a@x.com"))).await.unwrap();
        let caller = app.users.resolve_caller("a@x.com").await.unwrap();

        let mut update = UserUpdate {
            id: user.id,
            email: user.email.clone(),
            password: Some(user.password_hash.clone()),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        };
        let echoed = app
            .users
            .update(&caller, user.role_id, Some(update.clone()))
            .await
            .unwrap();
        assert_eq!(echoed.password_hash, user.password_hash);

        update.password = None;
        let omitted = app
            .users
            .update(&caller, user.role_id, Some(update.clone()))
            .await
            .unwrap();
        assert_eq!(omitted.password_hash, user.password_hash);

        update.password = Some("rotated".into());
        let rotated = app
            .users
            .update(&caller, user.role_id, Some(update))
            .await
            .unwrap();
        assert!(app.hasher.verify("rotated", &rotated.password_hash).unwrap());
    }

    #[tokio::test]
    async fn update_rejects_missing_payload_and_unknown_user() {
        let (_dir, app) = test_app();
        let caller = Caller::new(1, "ghost@x.com", "USER");

        assert!(app.users.update(&caller, 2, None).await.unwrap_err().is_validation());

        let update = UserUpdate {
            id: 77,
            email: "ghost@x.com".into(),
            password: None,
            first_name: "G".into(),
            last_name: "H".into(),
        };
        assert!(app
            .users
            .update(&caller, 2, Some(update))
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn authenticate_checks_password() {
        let (_dir, app) = test_app();
        app.users.create(Some(new_user("a@x.com"))).await.unwrap();

        let caller = app.users.authenticate("a@x.com", "secret").await.unwrap();
        assert_eq!(caller.email, "a@x.com");
        assert_eq!(caller.role, "USER");

        assert!(app
            .users
            .authenticate("a@x.com", "wrong")
            .await
            .unwrap_err()
            .is_forbidden());
        assert!(app
            .users
            .authenticate("nobody@x.com", "secret")
            .await
            .unwrap_err()
            .is_forbidden());
    }

    #[tokio::test]
    async fn password_change_is_hashed_off_the_database_thread() {
        let (_dir, app) = test_app_with(Arc::new(OffWorkerHasher));
        let user = app.users.create(Some(new_user("a@x.com"))).await.unwrap();
        let caller = app.users.resolve_caller("a@x.com").await.unwrap();

        let update = UserUpdate {
            id: user.id,
            email: user.email.clone(),
            password: Some("changed".into()),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        };
        let updated = app
            .users
            .update(&caller, user.role_id, Some(update))
            .await
            .unwrap();

        assert!(app.hasher.verify("changed", &updated.password_hash).unwrap());
        assert!(app.users.authenticate("a@x.com", "changed").await.is_ok());
    }
}
