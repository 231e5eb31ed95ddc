//! Error handling for the olive grove records server
//!
//! Every handler error ends up as a JSON body of the form
//! `{ "error": { "code", "message", "field"? } }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::log_book::LogWriteError;
use crate::store::StoreError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Log write failed: {0}")]
    LogWrite(#[from] LogWriteError),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Machine readable error code placed in the response body
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Store(_) => "STORE_ERROR",
            AppError::LogWrite(LogWriteError::Header(_)) => "LOG_WRITE_FAILED",
            AppError::LogWrite(LogWriteError::Detail { .. }) => "PARTIAL_WRITE",
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

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code().to_string();
        let (status, message, field) = match &self {
            AppError::Validation { field, message } => {
                (StatusCode::BAD_REQUEST, message.clone(), Some(field.clone()))
            }
            AppError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, format!("{} not found", resource), None)
            }
            AppError::Store(_) => (
                StatusCode::BAD_GATEWAY,
                "The data store could not complete the request".to_string(),
                None,
            ),
            AppError::LogWrite(LogWriteError::Header(_)) => (
                StatusCode::BAD_GATEWAY,
                "The log entry could not be saved".to_string(),
                None,
            ),
            AppError::LogWrite(LogWriteError::Detail { log_id, .. }) => (
                StatusCode::BAD_GATEWAY,
                format!(
                    "Log {} was saved but its details could not be stored",
                    log_id
                ),
                None,
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        let body = ErrorResponse {
            error: ErrorDetail {
                code,
                message,
                field,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
