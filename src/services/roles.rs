use crate::{
    db::{
        models::{Role, ADMIN_ROLE},
        repositories::RoleRepository,
        Database,
    },
    error::{require, require_text, EntityKind, ServiceError, ServiceResult},
    log_info,
};

const ENABLE_LOGS: bool = true;

/// Reference data: the fixed set of account roles.
///
/// `ADMIN` and the configured default role are looked up by name elsewhere,
/// so they can be neither renamed nor deleted.
#[derive(Clone)]
pub struct RoleRegistry {
    db: Database,
    default_role: String,
}

impl RoleRegistry {
    pub fn new(db: Database, default_role: String) -> Self {
        Self { db, default_role }
    }

    fn protected_names(&self) -> [String; 2] {
        [ADMIN_ROLE.to_string(), self.default_role.clone()]
    }

    /// Adds a role; the payload's `id` is ignored.
    pub async fn create(&self, role: Option<Role>) -> ServiceResult<Role> {
        let role = require(role, EntityKind::Role)?;
        require_text(&role.name, "role name")?;

        let created = self
            .db
            .transact(move |tx| {
                let repo = RoleRepository::new(tx);
                if repo.find_by_name(&role.name)?.is_some() {
                    return Err(ServiceError::invalid(format!(
                        "Role '{}' already exists",
                        role.name
                    )));
                }
                Ok(repo.insert(&role.name)?)
            })
            .await?;

        log_info!("Created role {} ({})", created.id, created.name);
        Ok(created)
    }

    pub async fn read_by_id(&self, id: i64) -> ServiceResult<Role> {
        self.db
            .transact(move |tx| {
                RoleRepository::new(tx)
                    .find_by_id(id)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::Role, id))
            })
            .await
    }

    pub async fn get_by_name(&self, name: &str) -> ServiceResult<Role> {
        let name = name.to_string();
        self.db
            .transact(move |tx| {
                RoleRepository::new(tx)
                    .find_by_name(&name)?
                    .ok_or_else(|| ServiceError::not_found_by_name(EntityKind::Role, name))
            })
            .await
    }

    /// Renames a role. Names stay unique and built-in roles keep theirs.
    pub async fn update(&self, role: Option<Role>) -> ServiceResult<Role> {
        let role = require(role, EntityKind::Role)?;
        require_text(&role.name, "role name")?;
        let protected = self.protected_names();

        let updated = self
            .db
            .transact(move |tx| {
                let repo = RoleRepository::new(tx);
                let stored = repo
                    .find_by_id(role.id)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::Role, role.id))?;
                if stored.name == role.name {
                    return Ok(stored);
                }
                if protected.contains(&stored.name) {
                    return Err(ServiceError::invalid(format!(
                        "Role '{}' is built in and cannot be renamed",
                        stored.name
                    )));
                }
                if repo.find_by_name(&role.name)?.is_some() {
                    return Err(ServiceError::invalid(format!(
                        "Role '{}' already exists",
                        role.name
                    )));
                }
                Ok(repo.save(&role)?)
            })
            .await?;

        log_info!("Updated role {}", updated.id);
        Ok(updated)
    }

    /// Fails with a validation error while any user still holds the role,
    /// and always for built-in roles.
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let protected = self.protected_names();

        self.db
            .transact(move |tx| {
                let repo = RoleRepository::new(tx);
                let role = repo
                    .find_by_id(id)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::Role, id))?;
                if protected.contains(&role.name) {
                    return Err(ServiceError::invalid(format!(
                        "Role '{}' is built in and cannot be deleted",
                        role.name
                    )));
                }
                if repo.count_with_role(id)? > 0 {
                    return Err(ServiceError::invalid(format!(
                        "Role '{}' is still assigned to users",
                        role.name
                    )));
                }
                repo.delete(id)?;
                Ok(())
            })
            .await?;

        log_info!("Deleted role {id}");
        Ok(())
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<Role>> {
        self.db
            .transact(|tx| Ok(RoleRepository::new(tx).find_all()?))
            .await
    }
}
