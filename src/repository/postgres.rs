//! PostgreSQL implementation of the persistence ports.
//!
//! Cascading deletes are enforced by the schema in `migrations/`: removing a project
//! removes its tasks and memberships, removing a user removes everything that user
//! owns, created or joined.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::{AuthRepository, ProjectRepository, TaskRepository, UserRepository};
use crate::error::AppError;
use crate::models::{Project, Session, Task, User, VerificationCode};

const USER_COLUMNS: &str = "id, name, email, created_at, is_verified";
const TASK_COLUMNS: &str = "id, name, description, project_id, user_id, created_at";

#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Unavailable(format!("Migration failed: {}", e)))
    }

    async fn insert_member(
        conn: &mut PgConnection,
        project_id: i64,
        user_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO project_members (project_id, user_id) VALUES ($1, $2)
             ON CONFLICT (project_id, user_id) DO NOTHING",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn create_user(&self, user: User) -> Result<User, AppError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (name, email, password, created_at, is_verified)
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.created_at)
        .bind(user.is_verified)
        .fetch_one(&self.pool)
        .await?;

        Ok(User { id, ..user })
    }

    async fn delete_user(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }

    async fn user_by_id(&self, id: i64) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn user_by_email(&self, email: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn users(&self) -> Result<Vec<User>, AppError> {
        let users =
            sqlx::query_as::<_, User>(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))
                .fetch_all(&self.pool)
                .await?;
        Ok(users)
    }

    async fn project_users(&self, project_id: i64) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT u.id, u.name, u.email, u.created_at, u.is_verified
             FROM users u
             JOIN project_members pm ON pm.user_id = u.id
             WHERE pm.project_id = $1
             ORDER BY u.id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn mark_verified(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET is_verified = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthRepository for PgRepository {
    async fn credentials_by_email(&self, email: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, created_at, is_verified FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn create_session(&self, session: &Session) -> Result<(), AppError> {
        sqlx::query("INSERT INTO sessions (id, user_id, created_at) VALUES ($1, $2, $3)")
            .bind(session.id)
            .bind(session.user_id)
            .bind(session.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn session_by_id(&self, id: Uuid) -> Result<Session, AppError> {
        sqlx::query_as::<_, Session>("SELECT id, user_id, created_at FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".into()))
    }

    async fn delete_session(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_verification_code(&self, code: &VerificationCode) -> Result<(), AppError> {
        sqlx::query("INSERT INTO verification_codes (code, user_id) VALUES ($1, $2)")
            .bind(&code.code)
            .bind(code.user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn user_id_by_code(&self, code: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT user_id FROM verification_codes WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Verification code not found".into()))
    }
}

#[async_trait]
impl ProjectRepository for PgRepository {
    async fn create_project_with_owner(&self, project: Project) -> Result<Project, AppError> {
        // Dropping the transaction without commit rolls both inserts back.
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO projects (name, owner_id, created_at) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&project.name)
        .bind(project.owner_id)
        .bind(project.created_at)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_member(&mut tx, id, project.owner_id).await?;

        tx.commit().await?;
        Ok(Project { id, ..project })
    }

    async fn project_by_id(&self, id: i64) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(
            "SELECT id, name, owner_id, created_at FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
    }

    async fn user_projects(&self, user_id: i64) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT p.id, p.name, p.owner_id, p.created_at
             FROM projects p
             JOIN project_members pm ON pm.project_id = p.id
             WHERE pm.user_id = $1
             ORDER BY p.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    async fn delete_project(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Project not found".into()));
        }
        Ok(())
    }

    async fn add_project_member(&self, project_id: i64, user_id: i64) -> Result<(), AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_member(&mut conn, project_id, user_id).await
    }

    async fn is_project_member(&self, project_id: i64, user_id: i64) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM project_members WHERE project_id = $1 AND user_id = $2)",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[async_trait]
impl TaskRepository for PgRepository {
    async fn create_task(&self, task: Task) -> Result<Task, AppError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO tasks (name, description, project_id, user_id, created_at)
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.project_id)
        .bind(task.user_id)
        .bind(task.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(Task { id, ..task })
    }

    async fn task_by_id(&self, id: i64) -> Result<Task, AppError> {
        sqlx::query_as::<_, Task>(&format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    async fn project_tasks(&self, project_id: i64) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE project_id = $1 ORDER BY created_at DESC",
            TASK_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn user_tasks(&self, user_id: i64) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE user_id = $1 ORDER BY created_at DESC",
            TASK_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }
}
