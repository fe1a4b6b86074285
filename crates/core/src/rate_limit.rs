//! Token bucket rate limiting for outbound requests
//!
//! The limiter itself never sleeps. Callers ask for a token with
//! [`RateLimiter::try_acquire`] and, when refused, wait for
//! [`RateLimiter::time_until_available`] before asking again.
//!
//! # Example
//!
//! ```rust
//! use restmap_core::rate_limit::{RateLimitConfig, RateLimiter};
//!
//! let limiter = RateLimiter::new(RateLimitConfig::max_rps(7));
//!
//! if limiter.try_acquire() {
//!     // send the request
//! } else {
//!     let wait = limiter.time_until_available(1);
//!     assert!(!wait.is_zero());
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Rate limiter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
    /// Burst allowance (extra requests allowed in short bursts)
    #[serde(default)]
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::max_rps(7)
    }
}

impl RateLimitConfig {
    /// At most `max` requests per second
    #[must_use]
    pub fn max_rps(max: u32) -> Self {
        Self {
            max_requests: max,
            window: Duration::from_secs(1),
            burst: 0,
        }
    }

    /// At most `max_requests` per `per_milliseconds`
    #[must_use]
    pub fn per_window(max_requests: u32, per_milliseconds: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_millis(per_milliseconds),
            burst: 0,
        }
    }

    /// Allow `burst` extra requests on top of the steady rate
    #[must_use]
    pub fn with_burst(mut self, burst: u32) -> Self {
        self.burst = burst;
        self
    }

    fn max_tokens(&self) -> u32 {
        self.max_requests.saturating_add(self.burst)
    }

    fn capacity(&self) -> f64 {
        f64::from(self.max_tokens())
    }

    fn refill_rate(&self) -> f64 {
        f64::from(self.max_requests) / self.window.as_secs_f64()
    }

    /// Check that the limiter can ever admit a request
    ///
    /// # Errors
    ///
    /// Returns a message when the request count or window is zero.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_requests == 0 {
            return Err("rate limit max_requests must be greater than zero".to_string());
        }
        if self.window.is_zero() {
            return Err("rate limit window must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Token bucket state
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn full(config: &RateLimitConfig) -> Self {
        Self {
            tokens: config.capacity(),
            last_update: Instant::now(),
        }
    }

    fn refill(&mut self, config: &RateLimitConfig) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update);
        let new_tokens = elapsed.as_secs_f64() * config.refill_rate();

        self.tokens = (self.tokens + new_tokens).min(config.capacity());
        self.last_update = now;
    }
}

/// Single-bucket rate limiter, safe to share between tasks
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Mutex<TokenBucket>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a new rate limiter with a full bucket
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            bucket: Mutex::new(TokenBucket::full(&config)),
            config,
        }
    }

    /// Configuration this limiter was built with
    #[must_use]
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Try to take one token
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_n(1)
    }

    /// Try to take `tokens` tokens at once
    #[must_use]
    pub fn try_acquire_n(&self, tokens: u32) -> bool {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        bucket.refill(&self.config);

        if bucket.tokens >= f64::from(tokens) {
            bucket.tokens -= f64::from(tokens);
            true
        } else {
            false
        }
    }

    /// Tokens currently available
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn available(&self) -> u32 {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        bucket.refill(&self.config);
        bucket.tokens as u32
    }

    /// Time until `tokens` tokens can be taken
    ///
    /// A limiter that never refills reports [`Duration::MAX`].
    #[must_use]
    pub fn time_until_available(&self, tokens: u32) -> Duration {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        bucket.refill(&self.config);

        if bucket.tokens >= f64::from(tokens) {
            return Duration::ZERO;
        }

        let needed = f64::from(tokens) - bucket.tokens;
        Duration::try_from_secs_f64(needed / self.config.refill_rate()).unwrap_or(Duration::MAX)
    }

    /// Refill the bucket completely
    pub fn reset(&self) {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        *bucket = TokenBucket::full(&self.config);
    }

    /// Get rate limit status
    #[must_use]
    pub fn status(&self) -> RateLimitStatus {
        RateLimitStatus {
            available: self.available(),
            max: self.config.max_tokens(),
            reset_in: self.time_until_available(self.config.max_requests),
        }
    }
}

/// Rate limit status
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStatus {
    /// Available tokens
    pub available: u32,
    /// Maximum tokens
    pub max: u32,
    /// Time until full reset
    pub reset_in: Duration,
}
