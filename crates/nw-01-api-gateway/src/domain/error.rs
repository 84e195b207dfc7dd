//! API Gateway error types and their HTTP mapping.
//!
//! Bad input is a client error. Timeouts, transport failures and backend
//! failures are server errors. There is no partial-content status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Error returned by an HTTP handler.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Bad HTTP input. No exchange was attempted.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Moderation refused the submitted content.
    #[error("rejected: {0}")]
    Rejected(String),

    /// No reply before the exchange deadline.
    #[error("backend timeout: {0}")]
    Timeout(String),

    /// Bus, protocol or backend failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
            ApiError::Timeout(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "invalid_request",
            ApiError::Rejected(_) => "rejected",
            ApiError::Timeout(_) => "timeout",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });
        (self.status(), Json(body)).into_response()
    }
}

/// Gateway lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Server stopped with an error
    #[error("server error: {0}")]
    Serve(String),
}
