//! Error handling for the gateway.

use std::time::Duration;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use teamdex_core::{Error as CoreError, ErrorCategory};
use thiserror::Error;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Error raised by the roster engine or catalog.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Request body, path or query could not be decoded.
    #[error("{0}")]
    BadRequest(String),

    /// The request did not finish within the configured timeout.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error flag.
    pub error: bool,
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
}

impl AppError {
    /// HTTP status and stable error code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Core(err) => match err.category() {
                ErrorCategory::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                ErrorCategory::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
                ErrorCategory::Invalid => (StatusCode::UNPROCESSABLE_ENTITY, invalid_code(err)),
                ErrorCategory::Retryable => {
                    (StatusCode::SERVICE_UNAVAILABLE, "TRANSACTION_FAILURE")
                }
                ErrorCategory::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

fn invalid_code(err: &CoreError) -> &'static str {
    match err {
        CoreError::IllegalAbility { .. } => "ILLEGAL_ABILITY",
        CoreError::IllegalMove { .. } => "ILLEGAL_MOVE",
        CoreError::DuplicateMove { .. } => "DUPLICATE_MOVE",
        CoreError::StructuralLimit { .. } => "STRUCTURAL_LIMIT",
        _ => "INVALID_INPUT",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        }

        let body = ErrorResponse {
            error: true,
            code: code.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
