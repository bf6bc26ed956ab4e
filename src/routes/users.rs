use actix_web::{delete, get, web, HttpResponse, Responder};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

#[get("/users")]
pub async fn list_users(
    state: web::Data<AppState>,
    _user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let users = state.users.users().await?;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    _user: CurrentUser,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let user = state.users.user_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Delete an account. Callers can only delete themselves; their projects, tasks,
/// memberships and sessions go with it.
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.users.delete_user(&caller, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
