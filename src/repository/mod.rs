//! Persistence ports.
//!
//! Each trait covers one bounded set of operations so that services depend only on the
//! capabilities they use and test doubles implement only what a given test needs.
//! Adapters translate "no rows" into [`AppError::NotFound`] at this boundary.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Project, Session, Task, User, VerificationCode};

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a user and returns it with the generated id.
    async fn create_user(&self, user: User) -> Result<User, AppError>;
    async fn delete_user(&self, id: i64) -> Result<(), AppError>;
    async fn user_by_id(&self, id: i64) -> Result<User, AppError>;
    async fn user_by_email(&self, email: &str) -> Result<User, AppError>;
    async fn users(&self) -> Result<Vec<User>, AppError>;
    /// Members of a project, owner included.
    async fn project_users(&self, project_id: i64) -> Result<Vec<User>, AppError>;
    async fn mark_verified(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Looks up a user together with the stored password hash.
    async fn credentials_by_email(&self, email: &str) -> Result<User, AppError>;
    async fn create_session(&self, session: &Session) -> Result<(), AppError>;
    async fn session_by_id(&self, id: Uuid) -> Result<Session, AppError>;
    /// Removes a session. Deleting an unknown session is not an error.
    async fn delete_session(&self, id: Uuid) -> Result<(), AppError>;
    async fn save_verification_code(&self, code: &VerificationCode) -> Result<(), AppError>;
    async fn user_id_by_code(&self, code: &str) -> Result<i64, AppError>;
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Inserts the project and the owner's membership in one transaction.
    ///
    /// Either both rows are committed or neither is.
    async fn create_project_with_owner(&self, project: Project) -> Result<Project, AppError>;
    async fn project_by_id(&self, id: i64) -> Result<Project, AppError>;
    /// Projects the user is a member of (owned projects included).
    async fn user_projects(&self, user_id: i64) -> Result<Vec<Project>, AppError>;
    /// Deletes the project together with its tasks and memberships.
    async fn delete_project(&self, id: i64) -> Result<(), AppError>;
    /// Adds a membership. Adding an existing member is a no-op.
    async fn add_project_member(&self, project_id: i64, user_id: i64) -> Result<(), AppError>;
    async fn is_project_member(&self, project_id: i64, user_id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create_task(&self, task: Task) -> Result<Task, AppError>;
    async fn task_by_id(&self, id: i64) -> Result<Task, AppError>;
    async fn project_tasks(&self, project_id: i64) -> Result<Vec<Task>, AppError>;
    /// Tasks created by the user.
    async fn user_tasks(&self, user_id: i64) -> Result<Vec<Task>, AppError>;
}
