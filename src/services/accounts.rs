use std::sync::Arc;

use chrono::Utc;
use tokio::sync::OnceCell;
use uuid::Uuid;
use validator::Validate;

use super::{with_deadline, ServiceSettings};
use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::{LoginRequest, RegisterRequest};
use crate::error::AppError;
use crate::models::{Session, User, VerificationCode};
use crate::notify::{Notification, Notifier};
use crate::repository::{AuthRepository, UserRepository};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Registration, email verification and sign-in.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    auth: Arc<dyn AuthRepository>,
    notifier: Arc<dyn Notifier>,
    settings: ServiceSettings,
    /// Hash checked against when the email is unknown, so both failure paths pay
    /// the same bcrypt cost.
    decoy_hash: OnceCell<String>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        auth: Arc<dyn AuthRepository>,
        notifier: Arc<dyn Notifier>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            users,
            auth,
            notifier,
            settings,
            decoy_hash: OnceCell::new(),
        }
    }

    async fn burn_decoy_check(&self, password: String) -> Result<(), AppError> {
        let cost = self.settings.bcrypt_cost;
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| hash_password_blocking(DECOY_PASSWORD.to_string(), cost))
            .await?;
        verify_password_blocking(password, decoy.clone()).await?;
        Ok(())
    }

    /// Creates an unverified account and mails its verification link.
    ///
    /// The account is persisted before the mail goes out; a failed dispatch is
    /// reported to the caller but does not undo the registration.
    pub async fn register(&self, input: RegisterRequest) -> Result<User, AppError> {
        input.validate()?;

        with_deadline(self.settings.request_timeout, async move {
            match self.users.user_by_email(&input.email).await {
                Ok(_) => {
                    return Err(AppError::Conflict(format!(
                        "Email {} is already registered",
                        input.email
                    )))
                }
                Err(AppError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }

            let password = hash_password_blocking(input.password, self.settings.bcrypt_cost).await?;
            let user = self
                .users
                .create_user(User {
                    id: 0,
                    name: input.name,
                    email: input.email,
                    password,
                    created_at: Utc::now(),
                    is_verified: false,
                })
                .await?;

            let code = VerificationCode::issue(user.id);
            self.auth.save_verification_code(&code).await?;
            log::info!("registered user {}", user.id);

            let notification =
                Notification::verification(&user.email, &self.settings.public_base_url, &code.code);
            if let Err(e) = self.notifier.send(&notification).await {
                log::error!("verification mail for user {} failed: {}", user.id, e);
                return Err(e);
            }

            Ok(user.without_password())
        })
        .await
    }

    /// Marks the account behind `code` as verified. Codes stay valid, so repeating a
    /// verification is harmless.
    pub async fn verify(&self, code: &str) -> Result<(), AppError> {
        if code.trim().is_empty() {
            return Err(AppError::Validation("Verification code is required".into()));
        }

        with_deadline(self.settings.request_timeout, async {
            let user_id = self.auth.user_id_by_code(code).await?;
            self.users.mark_verified(user_id).await?;
            log::info!("user {} verified", user_id);
            Ok(())
        })
        .await
    }

    /// Checks credentials and opens a session.
    ///
    /// Unknown email and wrong password produce the same error. The verification flag
    /// is only consulted once the password matched.
    pub async fn login(&self, credentials: LoginRequest) -> Result<Session, AppError> {
        credentials.validate()?;

        with_deadline(self.settings.request_timeout, async move {
            let user = match self.auth.credentials_by_email(&credentials.email).await {
                Ok(user) => user,
                Err(AppError::NotFound(_)) => {
                    self.burn_decoy_check(credentials.password).await?;
                    return Err(AppError::Unauthenticated(INVALID_CREDENTIALS.into()));
                }
                Err(e) => return Err(e),
            };

            if !verify_password_blocking(credentials.password, user.password.clone()).await? {
                log::debug!("password mismatch for user {}", user.id);
                return Err(AppError::Unauthenticated(INVALID_CREDENTIALS.into()));
            }

            if !user.is_verified {
                return Err(AppError::Unauthenticated(
                    "Account not verified, check your email".into(),
                ));
            }

            let session = Session::issue(user.id);
            self.auth.create_session(&session).await?;
            log::info!("user {} signed in", user.id);
            Ok(session)
        })
        .await
    }

    /// Ends the session behind `token`. Unknown or malformed tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        let Ok(id) = Uuid::parse_str(token) else {
            return Ok(());
        };
        with_deadline(self.settings.request_timeout, self.auth.delete_session(id)).await
    }
}
