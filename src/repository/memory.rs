//! In-memory implementation of the persistence ports.
//!
//! Mirrors the PostgreSQL schema's constraints: unique emails, foreign keys (reported
//! as `NotFound`), idempotent memberships and cascading deletes. All state sits behind
//! a single async mutex, so every operation, including project creation with its owner
//! membership, is atomic.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{AuthRepository, ProjectRepository, TaskRepository, UserRepository};
use crate::error::AppError;
use crate::models::{Project, Session, Task, User, VerificationCode};

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<i64, User>,
    sessions: HashMap<Uuid, Session>,
    codes: HashMap<String, i64>,
    projects: BTreeMap<i64, Project>,
    /// (project_id, user_id)
    members: BTreeSet<(i64, i64)>,
    tasks: BTreeMap<i64, Task>,
    last_user_id: i64,
    last_project_id: i64,
    last_task_id: i64,
}

impl State {
    fn require_user(&self, id: i64) -> Result<(), AppError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::NotFound("User not found".into()))
        }
    }

    fn require_project(&self, id: i64) -> Result<(), AppError> {
        if self.projects.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::NotFound("Project not found".into()))
        }
    }

    fn remove_project(&mut self, id: i64) -> bool {
        if self.projects.remove(&id).is_none() {
            return false;
        }
        self.members.retain(|(project_id, _)| *project_id != id);
        self.tasks.retain(|_, task| task.project_id != id);
        true
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn create_user(&self, user: User) -> Result<User, AppError> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Record already exists".into()));
        }

        state.last_user_id += 1;
        let user = User {
            id: state.last_user_id,
            ..user
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        if state.users.remove(&id).is_none() {
            return Err(AppError::NotFound("User not found".into()));
        }

        let owned: Vec<i64> = state
            .projects
            .values()
            .filter(|p| p.owner_id == id)
            .map(|p| p.id)
            .collect();
        for project_id in owned {
            state.remove_project(project_id);
        }
        state.sessions.retain(|_, s| s.user_id != id);
        state.codes.retain(|_, user_id| *user_id != id);
        state.members.retain(|(_, user_id)| *user_id != id);
        state.tasks.retain(|_, t| t.user_id != id);
        Ok(())
    }

    async fn user_by_id(&self, id: i64) -> Result<User, AppError> {
        let state = self.state.lock().await;
        state
            .users
            .get(&id)
            .cloned()
            .map(User::without_password)
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn user_by_email(&self, email: &str) -> Result<User, AppError> {
        let state = self.state.lock().await;
        state
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .map(User::without_password)
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn users(&self) -> Result<Vec<User>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .cloned()
            .map(User::without_password)
            .collect())
    }

    async fn project_users(&self, project_id: i64) -> Result<Vec<User>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .members
            .iter()
            .filter(|(p, _)| *p == project_id)
            .filter_map(|(_, user_id)| state.users.get(user_id))
            .cloned()
            .map(User::without_password)
            .collect())
    }

    async fn mark_verified(&self, id: i64) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        user.is_verified = true;
        Ok(())
    }
}

#[async_trait]
impl AuthRepository for InMemoryRepository {
    async fn credentials_by_email(&self, email: &str) -> Result<User, AppError> {
        let state = self.state.lock().await;
        state
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn create_session(&self, session: &Session) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        state.require_user(session.user_id)?;
        if state.sessions.contains_key(&session.id) {
            return Err(AppError::Conflict("Record already exists".into()));
        }
        state.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn session_by_id(&self, id: Uuid) -> Result<Session, AppError> {
        let state = self.state.lock().await;
        state
            .sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Session not found".into()))
    }

    async fn delete_session(&self, id: Uuid) -> Result<(), AppError> {
        self.state.lock().await.sessions.remove(&id);
        Ok(())
    }

    async fn save_verification_code(&self, code: &VerificationCode) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        state.require_user(code.user_id)?;
        if state.codes.contains_key(&code.code) {
            return Err(AppError::Conflict("Record already exists".into()));
        }
        state.codes.insert(code.code.clone(), code.user_id);
        Ok(())
    }

    async fn user_id_by_code(&self, code: &str) -> Result<i64, AppError> {
        let state = self.state.lock().await;
        state
            .codes
            .get(code)
            .copied()
            .ok_or_else(|| AppError::NotFound("Verification code not found".into()))
    }
}

#[async_trait]
impl ProjectRepository for InMemoryRepository {
    async fn create_project_with_owner(&self, project: Project) -> Result<Project, AppError> {
        let mut state = self.state.lock().await;
        state.require_user(project.owner_id)?;

        state.last_project_id += 1;
        let project = Project {
            id: state.last_project_id,
            ..project
        };
        state.projects.insert(project.id, project.clone());
        state.members.insert((project.id, project.owner_id));
        Ok(project)
    }

    async fn project_by_id(&self, id: i64) -> Result<Project, AppError> {
        let state = self.state.lock().await;
        state
            .projects
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Project not found".into()))
    }

    async fn user_projects(&self, user_id: i64) -> Result<Vec<Project>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .members
            .iter()
            .filter(|(_, member)| *member == user_id)
            .filter_map(|(project_id, _)| state.projects.get(project_id))
            .cloned()
            .collect())
    }

    async fn delete_project(&self, id: i64) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        if state.remove_project(id) {
            Ok(())
        } else {
            Err(AppError::NotFound("Project not found".into()))
        }
    }

    async fn add_project_member(&self, project_id: i64, user_id: i64) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        state.require_project(project_id)?;
        state.require_user(user_id)?;
        state.members.insert((project_id, user_id));
        Ok(())
    }

    async fn is_project_member(&self, project_id: i64, user_id: i64) -> Result<bool, AppError> {
        let state = self.state.lock().await;
        Ok(state.members.contains(&(project_id, user_id)))
    }
}

#[async_trait]
impl TaskRepository for InMemoryRepository {
    async fn create_task(&self, task: Task) -> Result<Task, AppError> {
        let mut state = self.state.lock().await;
        state.require_project(task.project_id)?;
        state.require_user(task.user_id)?;

        state.last_task_id += 1;
        let task = Task {
            id: state.last_task_id,
            ..task
        };
        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn task_by_id(&self, id: i64) -> Result<Task, AppError> {
        let state = self.state.lock().await;
        state
            .tasks
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    async fn project_tasks(&self, project_id: i64) -> Result<Vec<Task>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .tasks
            .values()
            .rev()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn user_tasks(&self, user_id: i64) -> Result<Vec<Task>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .tasks
            .values()
            .rev()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }
}
