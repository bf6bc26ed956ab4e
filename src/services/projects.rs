use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use validator::Validate;

use super::{require_id, with_deadline};
use crate::auth::policy::{self, ProjectAction};
use crate::error::AppError;
use crate::models::{AddMemberRequest, NewProject, Project, User};
use crate::repository::{ProjectRepository, UserRepository};

/// Project lifecycle and membership.
pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
    users: Arc<dyn UserRepository>,
    timeout: Duration,
}

impl ProjectService {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        users: Arc<dyn UserRepository>,
        timeout: Duration,
    ) -> Self {
        Self {
            projects,
            users,
            timeout,
        }
    }

    /// Creates a project owned by `caller`, who also becomes its first member.
    pub async fn create_project(&self, caller: &User, input: NewProject) -> Result<Project, AppError> {
        input.validate()?;

        let project = Project {
            id: 0,
            name: input.name,
            owner_id: caller.id,
            created_at: Utc::now(),
        };
        let project =
            with_deadline(self.timeout, self.projects.create_project_with_owner(project)).await?;
        log::info!("user {} created project {}", caller.id, project.id);
        Ok(project)
    }

    pub async fn project_by_id(&self, caller: &User, id: i64) -> Result<Project, AppError> {
        require_id(id, "Project")?;

        with_deadline(self.timeout, async {
            let project = self.projects.project_by_id(id).await?;
            policy::authorize_project(caller, &project, ProjectAction::Read)?;
            Ok(project)
        })
        .await
    }

    /// Projects `caller` belongs to.
    pub async fn user_projects(&self, caller: &User) -> Result<Vec<Project>, AppError> {
        with_deadline(self.timeout, self.projects.user_projects(caller.id)).await
    }

    pub async fn delete_project(&self, caller: &User, id: i64) -> Result<(), AppError> {
        require_id(id, "Project")?;

        with_deadline(self.timeout, async {
            let project = self.projects.project_by_id(id).await?;
            policy::authorize_project(caller, &project, ProjectAction::Delete)?;
            self.projects.delete_project(id).await?;
            log::info!("user {} deleted project {}", caller.id, id);
            Ok(())
        })
        .await
    }

    /// Grants `request.user_id` membership of the project. Re-adding a member is a
    /// no-op.
    pub async fn add_member(&self, caller: &User, request: AddMemberRequest) -> Result<(), AppError> {
        request.validate()?;

        with_deadline(self.timeout, async {
            let project = self.projects.project_by_id(request.project_id).await?;
            policy::authorize_project(caller, &project, ProjectAction::AddMember)?;
            self.users.user_by_id(request.user_id).await?;
            self.projects
                .add_project_member(request.project_id, request.user_id)
                .await?;
            log::info!(
                "user {} added to project {}",
                request.user_id,
                request.project_id
            );
            Ok(())
        })
        .await
    }

    /// Members of the project. Visible to members only.
    pub async fn project_members(&self, caller: &User, project_id: i64) -> Result<Vec<User>, AppError> {
        require_id(project_id, "Project")?;

        with_deadline(self.timeout, async {
            let project = self.projects.project_by_id(project_id).await?;
            let is_member = self.projects.is_project_member(project_id, caller.id).await?;
            policy::authorize_member_listing(caller, &project, is_member)?;
            self.users.project_users(project_id).await
        })
        .await
    }
}
