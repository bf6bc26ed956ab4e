use std::sync::Arc;
use std::time::Duration;

use validator::Validate;

use super::{require_id, with_deadline};
use crate::auth::policy::{self, ProjectAction};
use crate::error::AppError;
use crate::models::{NewTask, Task, User};
use crate::repository::{ProjectRepository, TaskRepository};

pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    projects: Arc<dyn ProjectRepository>,
    timeout: Duration,
}

impl TaskService {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        projects: Arc<dyn ProjectRepository>,
        timeout: Duration,
    ) -> Self {
        Self {
            tasks,
            projects,
            timeout,
        }
    }

    /// Creates a task in a project owned by `caller`.
    pub async fn create_task(&self, caller: &User, input: NewTask) -> Result<Task, AppError> {
        input.validate()?;

        with_deadline(self.timeout, async move {
            let project = self.projects.project_by_id(input.project_id).await?;
            policy::authorize_project(caller, &project, ProjectAction::CreateTask)?;
            let task = self.tasks.create_task(Task::new(input, caller.id)).await?;
            log::info!("user {} created task {} in project {}", caller.id, task.id, task.project_id);
            Ok(task)
        })
        .await
    }

    pub async fn task_by_id(&self, caller: &User, id: i64) -> Result<Task, AppError> {
        require_id(id, "Task")?;

        with_deadline(self.timeout, async {
            let task = self.tasks.task_by_id(id).await?;
            policy::authorize_task_read(caller, &task)?;
            Ok(task)
        })
        .await
    }

    /// All tasks of a project, newest first. Owner only.
    pub async fn project_tasks(&self, caller: &User, project_id: i64) -> Result<Vec<Task>, AppError> {
        require_id(project_id, "Project")?;

        with_deadline(self.timeout, async {
            let project = self.projects.project_by_id(project_id).await?;
            policy::authorize_project(caller, &project, ProjectAction::ListTasks)?;
            self.tasks.project_tasks(project_id).await
        })
        .await
    }

    /// Tasks created by `caller`, newest first.
    pub async fn user_tasks(&self, caller: &User) -> Result<Vec<Task>, AppError> {
        with_deadline(self.timeout, self.tasks.user_tasks(caller.id)).await
    }
}
