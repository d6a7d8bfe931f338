use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::validation::account::FieldErrors;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A pool construction error.
    #[error("Pool build error: {0}")]
    CreatePool(#[from] deadpool::managed::BuildError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A row was missing an expected column.
    #[error("Missing data in row: {0}")]
    MissingData(String),

    /// Field-level validation errors.
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    /// The email is already registered.
    #[error("Email already registered")]
    DuplicateEmail,

    /// Unknown email or wrong password; the cause is never distinguished.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

/// The message shown for any unexpected store failure. Internals go to the
/// log only.
const RETRY_MESSAGE: &str = "Something went wrong. Please try again.";

/// The single message for both unknown email and wrong password.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";

/// The field-level message attached to `email` on a duplicate registration.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "An account with this email already exists.";

fn json_body(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

fn generic_body(status: StatusCode, message: &str) -> Response {
    let body = sonic_rs::to_string(&sonic_rs::json!({
        "error": message
    }))
    .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());
    json_body(status, body)
}

fn field_errors_body(errors: &FieldErrors) -> Response {
    let body = sonic_rs::to_string(&sonic_rs::json!({
        "errors": errors.as_map()
    }))
    .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());
    json_body(StatusCode::UNPROCESSABLE_ENTITY, body)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                generic_body(StatusCode::INTERNAL_SERVER_ERROR, RETRY_MESSAGE)
            }

            AppError::Pool(ref e) => {
                tracing::error!("Pool error: {}", e);
                generic_body(StatusCode::INTERNAL_SERVER_ERROR, RETRY_MESSAGE)
            }

            AppError::CreatePool(ref e) => {
                tracing::error!("Pool build error: {}", e);
                generic_body(StatusCode::INTERNAL_SERVER_ERROR, RETRY_MESSAGE)
            }

            AppError::Redis(ref e) => {
                tracing::error!("Redis error: {}", e);
                generic_body(StatusCode::INTERNAL_SERVER_ERROR, RETRY_MESSAGE)
            }

            AppError::MissingData(ref column) => {
                tracing::error!("Missing data in row: {}", column);
                generic_body(StatusCode::INTERNAL_SERVER_ERROR, RETRY_MESSAGE)
            }

            AppError::Validation(ref errors) => {
                tracing::debug!("Validation failed: {}", errors);
                field_errors_body(errors)
            }

            AppError::DuplicateEmail => {
                tracing::debug!("Registration rejected: duplicate email");
                let mut errors = FieldErrors::new();
                errors.push("email", DUPLICATE_EMAIL_MESSAGE);
                field_errors_body(&errors)
            }

            AppError::InvalidCredentials => {
                tracing::warn!("Login rejected: invalid credentials");
                generic_body(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS_MESSAGE)
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                generic_body(StatusCode::INTERNAL_SERVER_ERROR, RETRY_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_unprocessable_entity() {
        let mut errors = FieldErrors::new();
        errors.push("email", "not a valid email address");
        let response = AppError::Validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn duplicate_email_maps_to_unprocessable_entity() {
        let response = AppError::DuplicateEmail.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn invalid_credentials_maps_to_unauthorized() {
        let response = AppError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn store_errors_hide_internals() {
        let response = AppError::Internal("pool exhausted".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
