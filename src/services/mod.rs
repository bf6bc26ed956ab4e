//! Resource coordinators.
//!
//! Every operation takes the already-resolved caller as an explicit argument, runs its
//! authorization check through [`crate::auth::policy`] after fetching the target
//! resource, and executes under the configured deadline.

pub mod accounts;
pub mod projects;
pub mod tasks;
pub mod users;

use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use crate::error::AppError;

pub use accounts::AccountService;
pub use projects::ProjectService;
pub use tasks::TaskService;
pub use users::UserService;

/// Tunables shared by the services.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub request_timeout: Duration,
    pub session_ttl: Duration,
    pub bcrypt_cost: u32,
    pub public_base_url: String,
}

impl From<&Config> for ServiceSettings {
    fn from(config: &Config) -> Self {
        Self {
            request_timeout: config.request_timeout,
            session_ttl: config.session_ttl,
            bcrypt_cost: config.bcrypt_cost,
            public_base_url: config.public_base_url.clone(),
        }
    }
}

/// Runs `operation` under `limit`. On expiry the operation is dropped, which cancels
/// any in-flight store call, and `AppError::Timeout` is returned.
pub async fn with_deadline<T, F>(limit: Duration, operation: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::time::timeout(limit, operation).await.map_err(|_| {
        AppError::Timeout(format!(
            "Operation exceeded its {} ms deadline",
            limit.as_millis()
        ))
    })?
}

/// Rejects identifiers no store can have issued.
pub fn require_id(id: i64, what: &str) -> Result<(), AppError> {
    if id > 0 {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{} id must be a positive integer",
            what
        )))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_with_deadline_passes_results_through() {
        let ok = with_deadline(Duration::from_secs(1), async { Ok::<_, AppError>(5) }).await;
        assert_eq!(ok, Ok(5));

        let err = with_deadline(Duration::from_secs(1), async {
            Err::<i32, _>(AppError::NotFound("Project not found".into()))
        })
        .await;
        assert_eq!(err, Err(AppError::NotFound("Project not found".into())));
    }

    #[actix_rt::test]
    async fn test_with_deadline_times_out() {
        let result = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, AppError>(())
        })
        .await;
        assert!(matches!(result, Err(AppError::Timeout(_))));
    }

    #[test]
    fn test_require_id() {
        assert!(require_id(1, "Project").is_ok());
        assert!(matches!(require_id(0, "Project"), Err(AppError::Validation(_))));
        assert!(matches!(require_id(-4, "Task"), Err(AppError::Validation(_))));
    }
}
