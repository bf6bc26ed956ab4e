use actix_web::{delete, get, post, web, HttpResponse, Responder};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::models::{AddMemberRequest, NewProject};
use crate::state::AppState;

/// Create a project owned by the caller.
///
/// ## Responses:
/// - `201 Created`: the new project.
/// - `422 Unprocessable Entity`: the name is empty or longer than 200 characters.
#[post("/projects")]
pub async fn create_project(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
    body: web::Json<NewProject>,
) -> Result<impl Responder, AppError> {
    let project = state
        .projects
        .create_project(&caller, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(project))
}

/// Projects the caller is a member of.
#[get("/projects")]
pub async fn list_projects(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<impl Responder, AppError> {
    let projects = state.projects.user_projects(&caller).await?;
    Ok(HttpResponse::Ok().json(projects))
}

#[get("/projects/{id}")]
pub async fn get_project(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let project = state
        .projects
        .project_by_id(&caller, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(project))
}

#[delete("/projects/{id}")]
pub async fn delete_project(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state
        .projects
        .delete_project(&caller, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Add a member to a project. Owner only.
#[post("/projects/users")]
pub async fn add_member(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
    body: web::Json<AddMemberRequest>,
) -> Result<impl Responder, AppError> {
    state
        .projects
        .add_member(&caller, body.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/projects/{project_id}/users")]
pub async fn list_members(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let members = state
        .projects
        .project_members(&caller, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(members))
}
