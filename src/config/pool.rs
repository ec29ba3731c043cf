//! Worker pool and admission gate configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of executors.
pub const DEFAULT_WORKER_COUNT: usize = 3;
/// Default queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;
/// Default executor thread stack size (2 MiB).
pub const DEFAULT_THREAD_STACK_SIZE: usize = 2 * 1024 * 1024;

/// Configuration of a [`WorkerPool`](crate::core::WorkerPool).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerPoolConfig {
    /// Number of executor threads spawned by `start`.
    pub worker_count: usize,
    /// Maximum number of queued, not yet dequeued jobs.
    pub queue_capacity: usize,
    /// Stack size of each executor thread in bytes.
    pub thread_stack_size: usize,
}

impl WorkerPoolConfig {
    /// Defaults: 3 workers, capacity 10.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of executors.
    #[must_use]
    pub const fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the queue capacity.
    #[must_use]
    pub const fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Set the executor stack size.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, thread_stack_size: usize) -> Self {
        self.thread_stack_size = thread_stack_size;
        self
    }

    /// Validate pool configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".into());
        }
        if self.queue_capacity == 0 {
            return Err("queue_capacity must be greater than 0".into());
        }
        if self.thread_stack_size < 64 * 1024 {
            return Err("thread_stack_size must be at least 64 KiB".into());
        }
        Ok(())
    }
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            thread_stack_size: DEFAULT_THREAD_STACK_SIZE,
        }
    }
}

/// Fixed-window admission gate settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed per identity per window.
    pub limit: u64,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl RateLimitConfig {
    /// Window as a [`Duration`].
    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Validate limiter settings.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.limit == 0 {
            return Err("rate_limit.limit must be greater than 0".into());
        }
        if self.window_secs == 0 {
            return Err("rate_limit.window_secs must be greater than 0".into());
        }
        Ok(())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: 100,
            window_secs: 10,
        }
    }
}
