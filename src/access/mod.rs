//! Access policy for users, ToDos and tasks.
//!
//! [`authorize`] is a pure predicate: it never touches the store. Callers load
//! the facts it needs (owner and collaborator emails) and evaluate it before
//! any mutation or resource-scoped read.
//!
//! Rules, any of which allows:
//! - the caller is `ADMIN`;
//! - the target is the caller's own user record (read or update);
//! - the target is a ToDo, or a task inside one, owned by the caller;
//! - the action is a read of a ToDo, or of its tasks, the caller collaborates on.

use std::fmt;

use crate::{
    auth::Caller,
    db::models::{TodoAccess, ADMIN_ROLE},
    error::{ServiceError, ServiceResult},
    log_warn,
};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// A single account, identified by its email.
    User { email: &'a str },
    /// The account directory as a whole: creating, deleting and listing users.
    UserDirectory,
    Todo(&'a TodoAccess),
    /// A task, judged by the ToDo that contains it.
    Task { parent: &'a TodoAccess },
}

impl Resource<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Resource::User { .. } => "user",
            Resource::UserDirectory => "user directory",
            Resource::Todo(_) => "todo",
            Resource::Task { .. } => "task",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

pub fn authorize(
    caller_email: &str,
    caller_role: &str,
    resource: &Resource<'_>,
    action: Action,
) -> Decision {
    if caller_role == ADMIN_ROLE {
        return Decision::Allow;
    }

    let allowed = match resource {
        Resource::User { email } => {
            *email == caller_email && matches!(action, Action::Read | Action::Update)
        }
        Resource::UserDirectory => false,
        Resource::Todo(todo) | Resource::Task { parent: todo } => {
            todo.owner_email == caller_email
                || (action == Action::Read && todo.collaborator_emails.contains(caller_email))
        }
    };

    if allowed {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Evaluates the policy for `caller` and turns a denial into `Forbidden`.
pub fn ensure(caller: &Caller, resource: &Resource<'_>, action: Action) -> ServiceResult<()> {
    match authorize(&caller.email, &caller.role, resource, action) {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            log_warn!(
                "Denied {} on {} for {}",
                action,
                resource.kind(),
                caller.email
            );
            Err(ServiceError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rstest::rstest;

    use super::*;

    const OWNER: &str = "owner@x.com";
    const COLLABORATOR: &str = "collab@x.com";
    const STRANGER: &str = "stranger@x.com";

    fn shared_todo() -> TodoAccess {
        TodoAccess {
            owner_email: OWNER.into(),
            collaborator_emails: BTreeSet::from([COLLABORATOR.to_string()]),
        }
    }

    #[rstest]
    #[case(OWNER, Action::Create, Decision::Allow)]
    #[case(OWNER, Action::Read, Decision::Allow)]
    #[case(OWNER, Action::Update, Decision::Allow)]
    #[case(OWNER, Action::Delete, Decision::Allow)]
    #[case(COLLABORATOR, Action::Read, Decision::Allow)]
    #[case(COLLABORATOR, Action::Update, Decision::Deny)]
    #[case(COLLABORATOR, Action::Delete, Decision::Deny)]
    #[case(COLLABORATOR, Action::Create, Decision::Deny)]
    #[case(STRANGER, Action::Read, Decision::Deny)]
    #[case(STRANGER, Action::Delete, Decision::Deny)]
    fn todo_rules(#[case] email: &str, #[case] action: Action, #[case] expected: Decision) {
        let todo = shared_todo();
        assert_eq!(authorize(email, "USER", &Resource::Todo(&todo), action), expected);
    }

    #[rstest]
    #[case(COLLABORATOR, Action::Read, Decision::Allow)]
    #[case(COLLABORATOR, Action::Update, Decision::Deny)]
    #[case(OWNER, Action::Delete, Decision::Allow)]
    #[case(STRANGER, Action::Read, Decision::Deny)]
    fn task_rules_follow_parent(
        #[case] email: &str,
        #[case] action: Action,
        #[case] expected: Decision,
    ) {
        let todo = shared_todo();
        let resource = Resource::Task { parent: &todo };
        assert_eq!(authorize(email, "USER", &resource, action), expected);
    }

    #[rstest]
    #[case(Action::Read, Decision::Allow)]
    #[case(Action::Update, Decision::Allow)]
    #[case(Action::Delete, Decision::Deny)]
    #[case(Action::Create, Decision::Deny)]
    fn self_service_on_own_record(#[case] action: Action, #[case] expected: Decision) {
        let resource = Resource::User { email: OWNER };
        assert_eq!(authorize(OWNER, "USER", &resource, action), expected);
        assert_eq!(authorize(STRANGER, "USER", &resource, action), Decision::Deny);
    }

    #[rstest]
    #[case(Action::Create)]
    #[case(Action::Read)]
    #[case(Action::Update)]
    #[case(Action::Delete)]
    fn admin_is_allowed_everything(#[case] action: Action) {
        let todo = shared_todo();
        let resources = [
            Resource::User { email: OWNER },
            Resource::UserDirectory,
            Resource::Todo(&todo),
            Resource::Task { parent: &todo },
        ];
        for resource in &resources {
            assert!(authorize(STRANGER, ADMIN_ROLE, resource, action).is_allowed());
        }
    }

    #[test]
    fn directory_is_admin_only() {
        assert_eq!(
            authorize(OWNER, "USER", &Resource::UserDirectory, Action::Read),
            Decision::Deny
        );
    }

    #[test]
    fn ensure_maps_denial_to_forbidden() {
        let todo = shared_todo();
        let caller = Caller::new(3, COLLABORATOR, "USER");
        let err = ensure(&caller, &Resource::Todo(&todo), Action::Delete).unwrap_err();
        assert!(err.is_forbidden());
        assert!(ensure(&caller, &Resource::Todo(&todo), Action::Read).is_ok());
    }
}
