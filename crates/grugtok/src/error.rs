//! Error types for the GrugTok server.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! Outbound failures are [`ClientError`]s and are almost always absorbed close to their
//! source; [`ApiError`] is what escapes to the HTTP boundary.

use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors from the outbound HTTP layer (arXiv, completion service).
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Non-success HTTP status
    #[error("Unexpected status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Upstream is not configured (missing API key, bad URL)
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Upstream answered but carried nothing usable
    #[error("Empty response from upstream")]
    EmptyResponse,
}

impl ClientError {
    /// Create a status error.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status { status, message: message.into() }
    }

    /// Create a not-configured error.
    #[must_use]
    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::NotConfigured(message.into())
    }

    /// Map a reqwest error, folding its timeout flavour into [`ClientError::Timeout`].
    #[must_use]
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() { Self::Timeout(timeout) } else { Self::Http(err) }
    }
}

/// Errors surfaced by the inbound HTTP API.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Request parameters were invalid
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Anything unexpected; details are logged, never returned
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to the caller.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::BadRequest(message) => message.clone(),
            Self::Internal(_) => "Failed to fetch papers".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!(error = %detail, "Request failed");
        }
        let body = Json(serde_json::json!({ "error": self.to_user_message() }));
        (self.status_code(), body).into_response()
    }
}

/// Result type alias for outbound client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
