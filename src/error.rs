//! Error types for the fileshare server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No files uploaded")]
    EmptyUpload,

    #[error("Package id already exists: {0}")]
    DuplicateId(String),

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Malformed package record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("File too large: {size} bytes (max: {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub(crate) fn malformed(id: impl Into<String>, reason: impl ToString) -> Self {
        AppError::MalformedRecord {
            id: id.into(),
            reason: reason.to_string(),
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::EmptyUpload => (
                StatusCode::BAD_REQUEST,
                "empty_upload",
                "No files uploaded".to_string(),
            ),
            AppError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                "not_found",
                "File not found".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::PayloadTooLarge { .. } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                self.to_string(),
            ),
            AppError::DuplicateId(id) => {
                tracing::error!(package_id = %id, "Package id collision");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "duplicate_id",
                    "Upload failed".to_string(),
                )
            }
            AppError::MalformedRecord { id, reason } => {
                tracing::error!(package_id = %id, "Malformed package record: {}", reason);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "malformed_record",
                    "Stored package is corrupted".to_string(),
                )
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "store_error",
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}
