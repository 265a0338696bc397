//! Error types for Cliptide
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
///
/// This enum represents all possible errors that can occur
/// in the application. It implements `IntoResponse` to
/// automatically convert errors to appropriate HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Resource not found")]
    NotFound,

    /// Authentication required (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Access denied (403)
    #[error("Access denied")]
    Forbidden,

    /// Validation error (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate unique field (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Object storage error (500)
    #[error("Storage error: {0}")]
    Storage(String),

    /// External call timed out (503)
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_)
            | AppError::Storage(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each error variant to the appropriate HTTP status code and
    /// wraps the message in the standard response envelope. Internal
    /// detail (SQL text, backtraces) never reaches the client.
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (message, error_type) = match &self {
            AppError::NotFound => (self.to_string(), "not_found"),
            AppError::Unauthorized => (self.to_string(), "unauthorized"),
            AppError::Forbidden => (self.to_string(), "forbidden"),
            AppError::Validation(msg) => (msg.clone(), "validation"),
            AppError::Conflict(msg) => (msg.clone(), "conflict"),
            AppError::Timeout(_) => ("Service temporarily unavailable".to_string(), "timeout"),
            AppError::Database(_) => ("Database error".to_string(), "database"),
            AppError::Storage(_) => ("Storage error".to_string(), "storage"),
            AppError::Config(_) => ("Configuration error".to_string(), "config"),
            AppError::Internal(_) => ("Internal server error".to_string(), "internal"),
        };

        // Record error metric
        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();

        crate::api::ApiResponse::<()>::error(status, message).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Map a sqlx error to `Conflict` when it is a unique-constraint
/// violation, passing everything else through as a database error.
pub fn map_unique_violation(err: sqlx::Error, conflict_message: &str) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return AppError::Conflict(conflict_message.to_string());
        }
    }
    AppError::Database(err)
}
