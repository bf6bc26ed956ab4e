use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents a project as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Project {
    /// Unique identifier, assigned by the store.
    pub id: i64,
    /// The project name.
    pub name: String,
    /// The user who created the project. The owner is always also a member.
    pub owner_id: i64,
    /// Timestamp of when the project was created.
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a project. The owner and creation time are set server-side.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewProject {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

/// Payload for granting a user membership of a project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct AddMemberRequest {
    #[validate(range(min = 1))]
    pub project_id: i64,
    #[validate(range(min = 1))]
    pub user_id: i64,
}
