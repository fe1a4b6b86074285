//! Core utilities shared by the restmap crates
//!
//! This crate provides the leaf building blocks used by the request engine:
//!
//! - **Error codes**: Stable numeric codes and categories for every failure
//! - **Rate limiting**: A token bucket used to throttle outbound requests
//! - **Validation**: Per-method required-field checks
//!
//! # Example
//!
//! ```rust
//! use restmap_core::rate_limit::{RateLimitConfig, RateLimiter};
//! use restmap_core::validation::RequiredFields;
//!
//! let limiter = RateLimiter::new(RateLimitConfig::max_rps(10));
//! assert!(limiter.try_acquire());
//!
//! let required = RequiredFields::new().with_method("getUser", ["id"]);
//! assert!(!required.check("getUser", |_| false).is_valid());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod rate_limit;
pub mod validation;

pub use error::ErrorCode;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::ErrorCode;
    pub use crate::rate_limit::{RateLimitConfig, RateLimitStatus, RateLimiter};
    pub use crate::validation::{RequiredFields, ValidationError, ValidationResult, Validator};
}
