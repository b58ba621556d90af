//! Error types for catalog-ai
//!
//! Validation and not-found errors carry a message meant for the caller.
//! Everything else is logged with its cause and answered with a generic
//! message so internal details never leave the service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message returned for every 500 response
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong on our end, please try again";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// catalog-common error
    #[error("Common error: {0}")]
    Common(#[from] catalog_common::Error),
}

impl ApiError {
    fn classify(&self) -> (StatusCode, &'static str, Option<String>) {
        use catalog_common::Error as Common;

        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", Some(msg.clone())),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", Some(msg.clone()))
            }
            ApiError::Common(Common::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", Some(msg.clone()))
            }
            ApiError::Common(Common::InvalidInput(msg)) | ApiError::Common(Common::Parse(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", Some(msg.clone()))
            }
            ApiError::Common(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", None),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = self.classify();

        let message = match message {
            Some(msg) => {
                tracing::debug!(status = status.as_u16(), "{}", msg);
                msg
            }
            None => {
                tracing::error!(error = %self, "Request failed");
                DEFAULT_ERROR_MESSAGE.to_string()
            }
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
