use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_id";

/// The user behind the request's session cookie.
///
/// Resolution goes through [`crate::auth::SessionResolver`] on every request; a missing
/// cookie or a token that does not resolve rejects the request with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .cookie(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty());
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let token =
                token.ok_or_else(|| AppError::Unauthenticated("Missing session cookie".into()))?;
            let state = state
                .ok_or_else(|| AppError::Internal("Application state not configured".into()))?;
            let user = state.sessions.resolve(&token).await?;
            Ok(CurrentUser(user))
        })
    }
}
