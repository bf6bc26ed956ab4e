pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;

use actix_cors::Cors;
use actix_web::web;

use crate::error::AppError;

/// CORS policy for the API. Only the listed origins get credentialed access; any
/// other origin receives no `Access-Control-Allow-*` headers.
pub fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "DELETE"])
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(health::health)
    // `/users/verify` must be registered before `/users/{id}`.
    .service(auth::verify)
    .service(auth::register)
    .service(auth::signin)
    .service(auth::signout)
    .service(users::list_users)
    .service(users::get_user)
    .service(users::delete_user)
    .service(projects::add_member)
    .service(projects::create_project)
    .service(projects::list_projects)
    .service(projects::get_project)
    .service(projects::delete_project)
    .service(projects::list_members)
    .service(tasks::list_project_tasks)
    .service(tasks::create_task)
    .service(tasks::list_tasks)
    .service(tasks::get_task);
}
