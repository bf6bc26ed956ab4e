//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every core operation (session resolution, authorization checks, project and task
//! coordination) reports failures as one of its variants, so the transport layer only
//! has to map a small, closed set of error kinds onto HTTP status codes.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert application errors
//! into HTTP responses with JSON bodies. `From` implementations for `sqlx::Error`,
//! `validator::ValidationErrors`, `bcrypt::BcryptError` and `reqwest::Error` allow the
//! `?` operator at the persistence, validation, hashing and notification boundaries.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
///
/// `Forbidden` is only ever raised after the target resource has been fetched, so a
/// missing resource always surfaces as `NotFound` first.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The requested entity does not exist (HTTP 404).
    #[error("Not Found: {0}")]
    NotFound(String),
    /// Missing, invalid, expired or unverified credential (HTTP 401).
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),
    /// Valid identity without rights over an existing resource (HTTP 403).
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// Uniqueness violation, e.g. an email that is already registered (HTTP 409).
    #[error("Conflict: {0}")]
    Conflict(String),
    /// Input that reached the core but cannot be valid (HTTP 422).
    #[error("Validation Error: {0}")]
    Validation(String),
    /// Malformed request that could not be decoded (HTTP 400).
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// Persistence, cache or network failure (HTTP 503).
    #[error("Unavailable: {0}")]
    Unavailable(String),
    /// The operation exceeded its deadline and was cancelled (HTTP 504).
    #[error("Timeout: {0}")]
    Timeout(String),
    /// Unexpected server-side error (HTTP 500).
    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message sent to the client. Infrastructure details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg)
            | AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::Timeout(msg) => msg.clone(),
            AppError::Unavailable(_) => "Service temporarily unavailable".into(),
            AppError::Internal(_) => "Internal server error".into(),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self, AppError::Unavailable(_) | AppError::Internal(_)) {
            log::error!("{}", self);
        }
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.public_message()
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// "No rows" becomes `NotFound`, unique violations become `Conflict`, foreign-key
/// violations (a referenced row vanished) become `NotFound`; everything else is an
/// infrastructure failure.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Record already exists".into())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::NotFound("Referenced record not found".into())
            }
            _ => AppError::Unavailable(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::Internal`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(error.to_string())
    }
}

/// Converts `reqwest::Error` (mail dispatch) into `AppError::Unavailable`.
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> AppError {
        AppError::Unavailable(format!("Notification dispatch failed: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_responses() {
        let cases: Vec<(AppError, u16)> = vec![
            (AppError::Unauthenticated("No session".into()), 401),
            (AppError::Forbidden("Not your project".into()), 403),
            (AppError::NotFound("Project not found".into()), 404),
            (AppError::Conflict("Email taken".into()), 409),
            (AppError::Validation("Bad id".into()), 422),
            (AppError::BadRequest("Invalid input".into()), 400),
            (AppError::Unavailable("db down".into()), 503),
            (AppError::Timeout("Deadline exceeded".into()), 504),
            (AppError::Internal("Server error".into()), 500),
        ];

        for (error, status) in cases {
            assert_eq!(error.error_response().status(), status, "{:?}", error);
        }
    }

    #[test]
    fn test_infrastructure_details_are_not_exposed() {
        let error = AppError::Unavailable("connection refused at 10.0.0.3:5432".into());
        assert_eq!(error.public_message(), "Service temporarily unavailable");

        let error = AppError::Forbidden("not your project".into());
        assert_eq!(error.public_message(), "not your project");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, AppError::NotFound(_)));

        let error: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(error, AppError::Unavailable(_)));
    }
}
