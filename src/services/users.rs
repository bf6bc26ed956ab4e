use std::sync::Arc;
use std::time::Duration;

use super::{require_id, with_deadline};
use crate::auth::policy;
use crate::error::AppError;
use crate::models::User;
use crate::repository::UserRepository;

pub struct UserService {
    users: Arc<dyn UserRepository>,
    timeout: Duration,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, timeout: Duration) -> Self {
        Self { users, timeout }
    }

    pub async fn user_by_id(&self, id: i64) -> Result<User, AppError> {
        require_id(id, "User")?;
        with_deadline(self.timeout, self.users.user_by_id(id)).await
    }

    pub async fn users(&self) -> Result<Vec<User>, AppError> {
        with_deadline(self.timeout, self.users.users()).await
    }

    /// Deletes an account together with everything it owns. Only the account holder
    /// may do this.
    pub async fn delete_user(&self, caller: &User, id: i64) -> Result<(), AppError> {
        require_id(id, "User")?;

        with_deadline(self.timeout, async {
            let target = self.users.user_by_id(id).await?;
            policy::authorize_account_removal(caller, &target)?;
            self.users.delete_user(id).await?;
            log::info!("user {} deleted", id);
            Ok(())
        })
        .await
    }
}
