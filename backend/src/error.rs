//! Error handling for the inventory ledger server
//!
//! Every handler returns [`AppResult`]; the error half renders as
//! `{ "error": { "code", "message", "field"? } }` with a matching status.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{AccountingError, DateError};
use sqlx::postgres::PgDatabaseError;
use thiserror::Error;

/// Postgres SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

const OPAQUE_DATABASE_MESSAGE: &str =
    "Could not perform database action. Please, review server logs.";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    // Business rule errors
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Validation failure tied to one input field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Detail of a unique violation, if this is one
    fn unique_violation(&self) -> Option<String> {
        let AppError::DatabaseError(sqlx::Error::Database(db_err)) = self else {
            return None;
        };
        if db_err.code().as_deref() != Some(UNIQUE_VIOLATION) {
            return None;
        }
        let detail = db_err
            .try_downcast_ref::<PgDatabaseError>()
            .and_then(|pg| pg.detail())
            .map(str::to_string)
            .unwrap_or_else(|| db_err.message().to_string());
        Some(detail)
    }
}

impl From<AccountingError> for AppError {
    fn from(err: AccountingError) -> Self {
        match err {
            AccountingError::InsufficientStock { .. } => {
                AppError::PreconditionFailed(err.to_string())
            }
            AccountingError::NonPositiveQuantity => AppError::validation("quantity", err.to_string()),
            AccountingError::StockOverflow | AccountingError::AmountOverflow => {
                AppError::ValidationError(err.to_string())
            }
        }
    }
}

impl From<DateError> for AppError {
    fn from(err: DateError) -> Self {
        match err {
            DateError::InvalidFormat(_) => AppError::ValidationError(err.to_string()),
            DateError::EndBeforeStart => AppError::validation("endDate", err.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(err) => {
                AppError::ValidationError(err.body_text())
            }
            other => AppError::Internal(other.body_text()),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(detail) = self.unique_violation() {
            tracing::warn!("Unique constraint violated: {}", detail);
            return AppError::Conflict(detail).into_response();
        }

        let (status, error_detail) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorDetail::new("NOT_FOUND", msg)),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new("VALIDATION_ERROR", message)
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", msg),
            ),
            AppError::PreconditionFailed(msg) => (
                StatusCode::PRECONDITION_FAILED,
                ErrorDetail::new("PRECONDITION_FAILED", msg),
            ),
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, ErrorDetail::new("CONFLICT", msg)),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", OPAQUE_DATABASE_MESSAGE),
            ),
            AppError::Internal(_) | AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
