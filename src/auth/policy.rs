//! Authorization rules.
//!
//! Every check is a pure function of the caller and a resource that has already been
//! fetched, so a missing resource is always reported as `NotFound` before any
//! permission is considered. Nothing here is cached; rules are re-evaluated on every
//! call.

use crate::error::AppError;
use crate::models::{Project, Task, User};

/// Operations on a project that only its owner may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAction {
    Read,
    Delete,
    AddMember,
    CreateTask,
    ListTasks,
}

impl ProjectAction {
    fn describe(self) -> &'static str {
        match self {
            ProjectAction::Read => "read",
            ProjectAction::Delete => "delete",
            ProjectAction::AddMember => "add members to",
            ProjectAction::CreateTask => "create tasks in",
            ProjectAction::ListTasks => "list tasks of",
        }
    }
}

fn deny(caller: &User, message: String) -> AppError {
    log::warn!("user {} denied: {}", caller.id, message);
    AppError::Forbidden(message)
}

pub fn authorize_project(
    caller: &User,
    project: &Project,
    action: ProjectAction,
) -> Result<(), AppError> {
    if project.owner_id == caller.id {
        Ok(())
    } else {
        Err(deny(
            caller,
            format!("Only the owner may {} project {}", action.describe(), project.id),
        ))
    }
}

/// Listing members is open to anyone who is a member, owner included.
pub fn authorize_member_listing(
    caller: &User,
    project: &Project,
    is_member: bool,
) -> Result<(), AppError> {
    if is_member || project.owner_id == caller.id {
        Ok(())
    } else {
        Err(deny(
            caller,
            format!("Not a member of project {}", project.id),
        ))
    }
}

/// Tasks are visible to their creator only.
pub fn authorize_task_read(caller: &User, task: &Task) -> Result<(), AppError> {
    if task.user_id == caller.id {
        Ok(())
    } else {
        Err(deny(caller, format!("Task {} belongs to another user", task.id)))
    }
}

/// Accounts can only be removed by their holder.
pub fn authorize_account_removal(caller: &User, target: &User) -> Result<(), AppError> {
    if caller.id == target.id {
        Ok(())
    } else {
        Err(deny(caller, format!("Cannot delete user {}", target.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: i64) -> User {
        User {
            id,
            name: format!("user{}", id),
            email: format!("user{}@example.com", id),
            password: String::new(),
            created_at: Utc::now(),
            is_verified: true,
        }
    }

    fn project(id: i64, owner_id: i64) -> Project {
        Project {
            id,
            name: "Apollo".to_string(),
            owner_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_only_project_actions() {
        let owner = user(1);
        let other = user(2);
        let apollo = project(10, owner.id);

        for action in [
            ProjectAction::Read,
            ProjectAction::Delete,
            ProjectAction::AddMember,
            ProjectAction::CreateTask,
            ProjectAction::ListTasks,
        ] {
            assert!(authorize_project(&owner, &apollo, action).is_ok());
            assert!(matches!(
                authorize_project(&other, &apollo, action),
                Err(AppError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn test_member_listing() {
        let apollo = project(10, 1);
        assert!(authorize_member_listing(&user(1), &apollo, false).is_ok());
        assert!(authorize_member_listing(&user(2), &apollo, true).is_ok());
        assert!(matches!(
            authorize_member_listing(&user(3), &apollo, false),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_task_read_is_creator_only() {
        let task = Task {
            id: 5,
            name: "Design".to_string(),
            description: String::new(),
            project_id: 10,
            user_id: 1,
            created_at: Utc::now(),
        };
        assert!(authorize_task_read(&user(1), &task).is_ok());
        assert!(matches!(
            authorize_task_read(&user(2), &task),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_account_removal_is_self_only() {
        assert!(authorize_account_removal(&user(1), &user(1)).is_ok());
        assert!(matches!(
            authorize_account_removal(&user(1), &user(2)),
            Err(AppError::Forbidden(_))
        ));
    }
}
