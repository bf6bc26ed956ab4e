use std::time::Duration;

use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{CurrentUser, LoginRequest, RegisterRequest, SESSION_COOKIE};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub code: Option<String>,
}

fn session_cookie(token: String, ttl: Duration) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(
            i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        ))
        .finish()
}

fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// Register a new user
///
/// Creates an unverified account and mails a verification link to the given address.
///
/// ## Responses:
/// - `201 Created`: the new user, without password.
/// - `409 Conflict`: the email is already registered.
/// - `422 Unprocessable Entity`: invalid name, email or password.
/// - `503 Service Unavailable`: the account was stored but the mail could not be sent.
#[post("/users")]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let user = state.accounts.register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Verify an email address with the code from the verification link.
#[get("/users/verify")]
pub async fn verify(
    state: web::Data<AppState>,
    query: web::Query<VerifyQuery>,
) -> Result<impl Responder, AppError> {
    let code = query
        .into_inner()
        .code
        .ok_or_else(|| AppError::BadRequest("Missing verification code".into()))?;
    state.accounts.verify(&code).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "verified" })))
}

/// Sign in
///
/// On success the session token is set as an HTTP-only `session_id` cookie.
///
/// ## Responses:
/// - `204 No Content`: signed in.
/// - `401 Unauthorized`: wrong credentials or unverified account.
#[post("/signin")]
pub async fn signin(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let session = state.accounts.login(body.into_inner()).await?;
    Ok(HttpResponse::NoContent()
        .cookie(session_cookie(session.id.to_string(), state.session_ttl))
        .finish())
}

/// Sign out, ending the current session and clearing the cookie.
#[post("/signout")]
pub async fn signout(
    state: web::Data<AppState>,
    req: HttpRequest,
    _user: CurrentUser,
) -> Result<impl Responder, AppError> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        state.accounts.logout(cookie.value()).await?;
    }
    Ok(HttpResponse::NoContent()
        .cookie(expired_session_cookie())
        .finish())
}
