//! Error types for the HTTP layer.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use livecode_core::ProxyError;
use serde_json::json;
use thiserror::Error;

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors that can occur while serving a request.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Failure reported by one of the proxies
    #[error(transparent)]
    Proxy(#[from] ProxyError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid request format
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request body exceeds the configured limit
    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    /// Server configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ServerError {
    /// Create a new invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a new configuration error.
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::Proxy(e) if e.is_client_error() => 400,
            ServerError::InvalidRequest(_) => 400,
            ServerError::PayloadTooLarge(_) => 413,
            ServerError::Proxy(_) | ServerError::Io(_) | ServerError::Config(_) => 500,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ServerError::Proxy(ProxyError::UnresolvedLanguage(_)) => "unsupported_language",
            ServerError::Proxy(ProxyError::RemoteUnavailable(_)) => "remote_unavailable",
            ServerError::Proxy(ProxyError::ProtocolError(_)) => "protocol_error",
            ServerError::Proxy(ProxyError::Config(_)) | ServerError::Config(_) => "config_error",
            ServerError::Io(_) => "io_error",
            ServerError::InvalidRequest(_) => "invalid_request",
            ServerError::PayloadTooLarge(_) => "payload_too_large",
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(rejection.body_text())
        } else {
            Self::InvalidRequest(rejection.body_text())
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
