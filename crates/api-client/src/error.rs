//! Error types for the API client

use restmap_core::ErrorCode;
use serde_json::Value;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid construction-time option or endpoint descriptor
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required call parameters were not supplied
    #[error("Validation failed for {}: {}", .method, missing_message(.missing))]
    Validation {
        /// Method that was called
        method: String,
        /// Required parameters that were absent
        missing: Vec<String>,
    },

    /// No method with this name is registered on the client
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Transport failure that did not originate in reqwest
    #[error("Transport error: {0}")]
    Transport(String),

    /// API returned a non-success status
    #[error("API error ({status}): {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response payload
        body: Value,
    },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A transformer or error handler failed
    #[error("Handler error: {0}")]
    Handler(String),
}

fn missing_message(missing: &[String]) -> String {
    missing
        .iter()
        .map(|field| format!("{field} param is required"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a handler error
    pub fn handler(msg: impl Into<String>) -> Self {
        Self::Handler(msg.into())
    }

    /// Create a status error
    pub fn status_error(status: u16, body: Value) -> Self {
        Self::Status { status, body }
    }

    /// Stable error code for this error
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Validation { .. } => ErrorCode::ValidationError,
            Self::UnknownMethod(_) => ErrorCode::UnknownMethod,
            Self::Request(e) if e.is_decode() => ErrorCode::DecodeError,
            Self::Request(_) | Self::Transport(_) => ErrorCode::TransportError,
            Self::Status { .. } => ErrorCode::BadStatus,
            Self::Json(_) => ErrorCode::DecodeError,
            Self::Handler(_) => ErrorCode::HandlerError,
        }
    }

    /// HTTP status carried by this error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s >= 500)
    }
}
