//! Fixed-window admission gate.
//!
//! Each identity gets one counter per window. The first hit of a window arms
//! the counter's expiry; every hit is allowed while the count stays within
//! the limit. Counter storage is injected through [`CounterStore`] so the gate
//! can run against Redis in production and a map in tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

/// Prefix of every counter key.
pub const KEY_PREFIX: &str = "rate_limit:";

/// Failure reported by a counter store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or rejected the command.
    #[error("counter store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by a [`RateLimiter`]. Denial is not an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RateLimitError {
    /// The counter could not be incremented.
    #[error("rate limiter store error: {0}")]
    Store(#[from] StoreError),
}

/// Shared counter storage with per-key expiry.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment `key` (created at 0 if absent) and return the new value.
    async fn incr(&self, key: &str) -> Result<u64, StoreError>;

    /// Set `key` to expire `ttl` from now.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Increment `key`, arming a `window` expiry when this opens a new window.
    ///
    /// The default runs `incr` then `expire` as two steps; a failed `expire`
    /// is logged and does not fail the increment. Stores with an atomic
    /// primitive should override this.
    async fn incr_window(&self, key: &str, window: Duration) -> Result<u64, StoreError> {
        let count = self.incr(key).await?;
        if count == 1 {
            if let Err(e) = self.expire(key, window).await {
                warn!(key = key, error = %e, "failed to arm rate-limit window expiry");
            }
        }
        Ok(count)
    }
}

/// Per-identity admission decision.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record one request from `identity` and decide whether it is admitted.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::Store`] when the counter could not be read or
    /// incremented; callers should treat that as an internal failure.
    async fn allow(&self, identity: &str) -> Result<bool, RateLimitError>;
}

/// Fixed-window counter limiter.
pub struct FixedWindowLimiter {
    store: Arc<dyn CounterStore>,
    limit: u64,
    window: Duration,
}

impl FixedWindowLimiter {
    /// Allow `limit` requests per identity per `window`.
    pub fn new(store: Arc<dyn CounterStore>, limit: u64, window: Duration) -> Self {
        Self { store, limit, window }
    }

    /// Requests allowed per window.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Window length.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Counter key for `identity`.
    #[must_use]
    pub fn key_for(identity: &str) -> String {
        format!("{KEY_PREFIX}{identity}")
    }
}

#[async_trait]
impl RateLimiter for FixedWindowLimiter {
    async fn allow(&self, identity: &str) -> Result<bool, RateLimitError> {
        let key = Self::key_for(identity);
        let count = self.store.incr_window(&key, self.window).await?;
        debug!(identity = identity, count = count, limit = self.limit, "rate limit check");
        Ok(count <= self.limit)
    }
}
