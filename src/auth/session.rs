use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;
use crate::repository::{AuthRepository, UserRepository};
use crate::services::with_deadline;

/// Turns an opaque session token into the user it belongs to.
pub struct SessionResolver {
    auth: Arc<dyn AuthRepository>,
    users: Arc<dyn UserRepository>,
    ttl: Duration,
    timeout: Duration,
}

impl SessionResolver {
    pub fn new(
        auth: Arc<dyn AuthRepository>,
        users: Arc<dyn UserRepository>,
        ttl: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            auth,
            users,
            ttl,
            timeout,
        }
    }

    /// Resolves `token` to a user.
    ///
    /// Malformed, unknown and expired tokens are all `Unauthenticated`. Expired sessions
    /// are removed on the way out. Store failures propagate unchanged.
    pub async fn resolve(&self, token: &str) -> Result<User, AppError> {
        with_deadline(self.timeout, async {
            let id = Uuid::parse_str(token)
                .map_err(|_| AppError::Unauthenticated("Invalid session".into()))?;

            let session = match self.auth.session_by_id(id).await {
                Ok(session) => session,
                Err(AppError::NotFound(_)) => {
                    return Err(AppError::Unauthenticated("Invalid session".into()))
                }
                Err(e) => return Err(e),
            };

            if session.is_expired(self.ttl, Utc::now()) {
                log::debug!("session for user {} expired", session.user_id);
                if let Err(e) = self.auth.delete_session(session.id).await {
                    log::warn!("failed to remove expired session: {}", e);
                }
                return Err(AppError::Unauthenticated("Session expired".into()));
            }

            // The account may have been deleted while the session was still live.
            match self.users.user_by_id(session.user_id).await {
                Ok(user) => Ok(user),
                Err(AppError::NotFound(_)) => {
                    Err(AppError::Unauthenticated("Invalid session".into()))
                }
                Err(e) => Err(e),
            }
        })
        .await
    }
}
