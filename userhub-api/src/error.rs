/// Error handling for the API server
///
/// Handlers return `Result<T, ApiError>`; the error converts to an HTTP
/// response with an `{"error": …}` JSON body.
///
/// Database errors on write paths never escape as raw 500s: the route
/// handlers catch them and report 409 Conflict with the error text behind
/// a fixed `insert failed:` / `update failed:` prefix, logging the detail
/// internally. Only read-path failures reach the `Internal` variant here.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing required input (400); the message is fixed per route
    #[error("{0}")]
    BadRequest(String),

    /// Lookup miss on GET-by-id (404)
    #[error("not found")]
    NotFound,

    /// The store rejected a write (409); the message carries the
    /// interpolated detail
    #[error("{0}")]
    Conflict(String),

    /// Anything the client cannot act on (500); detail is logged, not
    /// returned
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}
