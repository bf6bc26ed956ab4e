use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Input structure for creating a task under a project.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTask {
    /// The name of the task.
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    /// Free-form description, at most 2000 characters.
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,

    /// The project the task belongs to.
    #[validate(range(min = 1))]
    pub project_id: i64,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier, assigned by the store.
    pub id: i64,
    /// The name of the task.
    pub name: String,
    /// Description of the task.
    pub description: String,
    /// The project the task was created under.
    pub project_id: i64,
    /// Identifier of the user who created the task. Read access is keyed to this field,
    /// not to project membership.
    pub user_id: i64,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Builds an unsaved task attributed to `user_id`, stamped with the current time.
    /// The store assigns `id`.
    pub fn new(input: NewTask, user_id: i64) -> Self {
        Self {
            id: 0,
            name: input.name,
            description: input.description,
            project_id: input.project_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}
