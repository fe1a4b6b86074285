//! Stable error codes shared by the restmap crates
//!
//! Every error surfaced by the client maps to an [`ErrorCode`] so callers can
//! branch on a number instead of matching message text:
//! - Transport errors (2xxx)
//! - Configuration errors (3xxx)
//! - Validation errors (6xxx)
//! - Handler errors (9xxx)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // General errors (1xxx)
    /// Unclassified failure
    Unknown = 1000,

    // Transport errors (2xxx)
    /// Network or connection failure
    TransportError = 2000,
    /// Server answered with a non-success status
    BadStatus = 2001,
    /// Response payload could not be decoded
    DecodeError = 2002,

    // Configuration errors (3xxx)
    /// Invalid construction-time option
    ConfigError = 3000,
    /// Method name is not registered on the client
    UnknownMethod = 3001,

    // Validation errors (6xxx)
    /// Required call parameter missing
    ValidationError = 6000,

    // Handler errors (9xxx)
    /// A user-supplied error handler or transformer failed
    HandlerError = 9000,
}

impl ErrorCode {
    /// Get the numeric code
    #[must_use]
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "Transport",
            3 => "Configuration",
            6 => "Validation",
            9 => "Handler",
            _ => "Unknown",
        }
    }

    /// Whether the failure happened before any request left the process
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self.code() / 1000, 3 | 6)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
