//! Error types for evf-server
//!
//! Every failure leaves the server as `{"error": "<message>"}` with a 4xx/5xx
//! status. Store failures are logged in full and reported generically.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
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
    #[error("{0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// evf-common error
    #[error(transparent)]
    Common(#[from] evf_common::Error),
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{} not found", what))
    }

    fn status_and_message(self) -> (StatusCode, String) {
        use evf_common::Error as Common;

        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Common(err) => match err {
                Common::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
                Common::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                Common::Conflict(msg) => {
                    tracing::warn!(error = %msg, "Unique key conflict");
                    (StatusCode::CONFLICT, "A record with this name or slug already exists".to_string())
                }
                other => {
                    tracing::error!(error = %other, "Request failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        // Unknown fields, type mismatches and malformed JSON alike
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
