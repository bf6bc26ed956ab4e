use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A login session. The `id` is the opaque token handed to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Issues a fresh session for `user_id` with a random v4 token.
    pub fn issue(user_id: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
        }
    }

    /// A session created "in the future" (clock skew between nodes) counts as fresh.
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match (now - self.created_at).to_std() {
            Ok(age) => age >= ttl,
            Err(_) => false,
        }
    }
}

/// Email verification code bound to the user it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct VerificationCode {
    pub code: String,
    pub user_id: i64,
}

impl VerificationCode {
    pub fn issue(user_id: i64) -> Self {
        Self {
            code: Uuid::new_v4().to_string(),
            user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_tokens_are_unique() {
        let first = Session::issue(1);
        let second = Session::issue(1);
        assert_ne!(first.id, second.id);
        assert_ne!(VerificationCode::issue(1).code, VerificationCode::issue(1).code);
    }

    #[test]
    fn test_session_expiry() {
        let session = Session::issue(1);
        let ttl = Duration::from_secs(24 * 3600);

        assert!(!session.is_expired(ttl, session.created_at));
        assert!(!session.is_expired(ttl, session.created_at - chrono::Duration::minutes(5)));
        assert!(!session.is_expired(ttl, session.created_at + chrono::Duration::hours(23)));
        assert!(session.is_expired(ttl, session.created_at + chrono::Duration::hours(24)));
    }
}
