//! Error types for lexd-cr
//!
//! Maps store-level failures onto HTTP statuses: a vanished change is 404,
//! a second verdict on the same change is 409, a lock that outlived the
//! retry budget is 503.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g. change already reviewed
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store kept reporting the database as locked (503)
    #[error("Store busy: {0}")]
    Busy(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<lexd_common::Error> for ApiError {
    fn from(err: lexd_common::Error) -> Self {
        use lexd_common::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Validation(msg) => ApiError::BadRequest(msg),
            Error::InvalidKey(msg) => ApiError::BadRequest(msg),
            Error::Busy(msg) => ApiError::Busy(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Busy(msg) => (StatusCode::SERVICE_UNAVAILABLE, "BUSY", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
