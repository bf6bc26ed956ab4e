use actix_web::{get, post, web, HttpResponse, Responder};

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::models::NewTask;
use crate::state::AppState;

/// Create a task in a project owned by the caller.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `403 Forbidden`: the caller does not own the project.
/// - `404 Not Found`: the project does not exist.
#[post("/tasks")]
pub async fn create_task(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
    body: web::Json<NewTask>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.create_task(&caller, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Tasks created by the caller, newest first.
#[get("/tasks")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.user_tasks(&caller).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

#[get("/tasks/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.task_by_id(&caller, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// All tasks of a project, newest first. Owner only.
#[get("/projects/{project_id}/tasks")]
pub async fn list_project_tasks(
    state: web::Data<AppState>,
    CurrentUser(caller): CurrentUser,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let tasks = state
        .tasks
        .project_tasks(&caller, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(tasks))
}
