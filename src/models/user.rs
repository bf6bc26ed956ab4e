use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account.
///
/// `password` holds the bcrypt hash and is only populated by credential lookups; it is
/// never serialized, so neither API responses nor cache entries can carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    #[sqlx(default)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub is_verified: bool,
}

impl User {
    /// Returns the user with the credential stripped.
    pub fn without_password(mut self) -> Self {
        self.password.clear();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "$2b$04$somehash".to_string(),
            created_at: Utc::now(),
            is_verified: false,
        }
    }

    #[test]
    fn test_password_is_never_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "alice@example.com");
        assert_eq!(json["is_verified"], false);
    }

    #[test]
    fn test_deserialized_user_has_empty_password() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        let user: User = serde_json::from_str(&json).unwrap();
        assert!(user.password.is_empty());
        assert_eq!(user.id, 7);
    }

    #[test]
    fn test_without_password() {
        let user = sample_user().without_password();
        assert!(user.password.is_empty());
        assert_eq!(user.name, "Alice");
    }
}
