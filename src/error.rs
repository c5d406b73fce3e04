//! Domain error types for the test case lifecycle server.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::{HttpResponse, ResponseError};
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use std::fmt;

/// PostgreSQL SQLSTATE raised when `lock_timeout` expires.
const LOCK_NOT_AVAILABLE: &str = "55P03";

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Lock wait expired or a concurrent writer won a race; safe to retry
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    /// Classify a database error raised while doing `context`.
    ///
    /// Unique violations and lock timeouts become `Conflict`; everything else
    /// stays a `Database` error.
    pub fn from_db(context: &str, err: DbErr) -> Self {
        if is_lock_timeout(&err) {
            return AppError::Conflict(format!("{}: lock wait timed out, retry", context));
        }
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                AppError::Conflict(format!("{}: {}", context, detail))
            }
            _ => AppError::Database(format!("{}: {}", context, err)),
        }
    }
}

fn is_lock_timeout(err: &DbErr) -> bool {
    match err {
        DbErr::Query(RuntimeErr::SqlxError(e)) | DbErr::Exec(RuntimeErr::SqlxError(e)) => e
            .as_database_error()
            .and_then(|d| d.code())
            .is_some_and(|code| code == LOCK_NOT_AVAILABLE),
        _ => false,
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_code, response_message) = match self {
            AppError::Database(err_str) => {
                tracing::error!("Database error: {}", err_str);
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::NotFound(_) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                self.to_string(),
            ),
            AppError::InvalidInput(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
                self.to_string(),
            ),
            AppError::Conflict(_) => (
                actix_web::http::StatusCode::CONFLICT,
                "CONFLICT",
                self.to_string(),
            ),
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: error_code.to_string(),
            message: response_message,
        })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

/// Failure of a post-commit side effect.
///
/// Deliberately not convertible into `AppError`: the committed operation has
/// already succeeded by the time these occur.
#[derive(Debug, thiserror::Error)]
pub enum SideEffectError {
    #[error("Failed to notify user {user_id}: {reason}")]
    Notification { user_id: uuid::Uuid, reason: String },

    #[error("Failed to file bug for test case {test_case_id}: {reason}")]
    BugFiling {
        test_case_id: uuid::Uuid,
        reason: String,
    },
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::from_db("Database operation failed", err)
    }
}
