//! Throughput throttling in front of a transport
//!
//! Requests over the configured ceiling wait here until the token bucket has
//! room, so callers observe queueing as a slower response rather than an error.

use crate::error::{ApiError, ApiResult};
use crate::transport::{Transport, TransportRequest, TransportResponse};
use async_trait::async_trait;
use restmap_core::rate_limit::{RateLimitConfig, RateLimitStatus, RateLimiter};
use std::sync::Arc;
use tracing::debug;

/// Transport wrapper admitting at most the configured number of requests per window
#[derive(Debug, Clone)]
pub struct RateLimitedTransport<T> {
    inner: T,
    limiter: Arc<RateLimiter>,
}

impl<T: Transport> RateLimitedTransport<T> {
    /// Wrap `inner` with a limiter built from `config`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when `config` can never admit a request.
    pub fn new(inner: T, config: RateLimitConfig) -> ApiResult<Self> {
        config.validate().map_err(ApiError::config)?;
        Ok(Self {
            inner,
            limiter: Arc::new(RateLimiter::new(config)),
        })
    }

    /// Current limiter status
    #[must_use]
    pub fn status(&self) -> RateLimitStatus {
        self.limiter.status()
    }

    /// Wait until a token is available and take it
    async fn acquire(&self) {
        loop {
            if self.limiter.try_acquire() {
                return;
            }
            let delay = self.limiter.time_until_available(1);
            debug!(delay_ms = delay.as_millis(), "Rate limited, waiting for a token");
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl<T: Transport> Transport for RateLimitedTransport<T> {
    async fn send(&self, request: TransportRequest) -> ApiResult<TransportResponse> {
        self.acquire().await;
        self.inner.send(request).await
    }
}
