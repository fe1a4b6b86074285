//! Transport middleware
//!
//! Wrappers that add behavior around any [`Transport`](crate::transport::Transport).

pub mod rate_limit;

pub use rate_limit::RateLimitedTransport;
pub use restmap_core::rate_limit::{RateLimitConfig, RateLimitStatus, RateLimiter};
