//! Bounded worker pool with cooperative shutdown.
//!
//! The pool owns one bounded FIFO queue of [`Job`](crate::core::Job)s and a
//! fixed number of executor threads pulling from it. Shutdown is driven by two
//! independent signals:
//!
//! - **Queue closure** (`stop`): no more input. Busy executors drain what was
//!   already enqueued, then exit.
//! - **Cancellation** ([`CancellationSignal`](crate::core::CancellationSignal)):
//!   stop now. Idle executors exit immediately; queued items are stranded.
//!
//! Executors select over both, so neither a never-cancelled signal nor a
//! never-closed queue can park them forever. The termination path is
//! `cancel -> stop -> wait`, exactly once per pool.
//!
//! # Example
//!
//! ```rust,ignore
//! let pool = WorkerPool::new(WorkerPoolConfig::new().with_worker_count(3).with_queue_capacity(10))?;
//! let signal = CancellationSignal::new();
//! pool.start(signal.clone())?;
//! pool.enqueue(Notification::new("welcome").into())?;
//! pool.shutdown(&signal);
//! ```

mod native;

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Errors that can occur when using a `WorkerPool`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The queue is full (non-blocking submission only).
    QueueFull,

    /// `stop` has been called; the queue no longer accepts work.
    PoolShutdown,

    /// The cancellation signal fired while waiting to enqueue.
    Cancelled,

    /// `start` was called more than once.
    AlreadyStarted,

    /// Configuration validation failed.
    InvalidConfig(String),

    /// Internal error (thread spawn failure, blocking task join failure).
    Internal(String),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => write!(f, "work queue is full"),
            Self::PoolShutdown => write!(f, "pool has been shut down"),
            Self::Cancelled => write!(f, "pool has been cancelled"),
            Self::AlreadyStarted => write!(f, "pool has already been started"),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for PoolError {}

/// Point-in-time view of pool activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Configured number of executors.
    pub worker_count: usize,

    /// Executors currently alive.
    pub live_workers: usize,

    /// Queue capacity.
    pub queue_capacity: usize,

    /// Jobs waiting in the queue.
    pub queued_jobs: usize,

    /// Jobs currently inside `process()`.
    pub active_jobs: u64,

    /// Jobs accepted by the queue.
    pub submitted_jobs: u64,

    /// Jobs that returned `Ok`.
    pub completed_jobs: u64,

    /// Jobs that returned an error or panicked.
    pub failed_jobs: u64,
}

/// Internal counters for pool statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub live_workers: AtomicUsize,
    pub active_jobs: AtomicU64,
    pub submitted_jobs: AtomicU64,
    pub completed_jobs: AtomicU64,
    pub failed_jobs: AtomicU64,
}

impl PoolCounters {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self, worker_count: usize, queue_capacity: usize, queued_jobs: usize) -> PoolStats {
        PoolStats {
            worker_count,
            live_workers: self.live_workers.load(Ordering::Acquire),
            queue_capacity,
            queued_jobs,
            active_jobs: self.active_jobs.load(Ordering::Relaxed),
            submitted_jobs: self.submitted_jobs.load(Ordering::Relaxed),
            completed_jobs: self.completed_jobs.load(Ordering::Relaxed),
            failed_jobs: self.failed_jobs.load(Ordering::Relaxed),
        }
    }
}

pub use native::WorkerPool;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_error_display() {
        assert_eq!(PoolError::QueueFull.to_string(), "work queue is full");
        assert_eq!(PoolError::PoolShutdown.to_string(), "pool has been shut down");
        assert_eq!(
            PoolError::InvalidConfig("worker_count must be greater than 0".into()).to_string(),
            "invalid configuration: worker_count must be greater than 0"
        );
    }

    #[test]
    fn test_pool_counters_snapshot() {
        let counters = PoolCounters::default();
        counters.submitted_jobs.fetch_add(10, Ordering::Relaxed);
        counters.completed_jobs.fetch_add(7, Ordering::Relaxed);
        counters.failed_jobs.fetch_add(2, Ordering::Relaxed);
        counters.live_workers.fetch_add(3, Ordering::Release);

        let stats = counters.snapshot(3, 10, 1);
        assert_eq!(stats.worker_count, 3);
        assert_eq!(stats.live_workers, 3);
        assert_eq!(stats.queued_jobs, 1);
        assert_eq!(stats.submitted_jobs, 10);
        assert_eq!(stats.completed_jobs, 7);
        assert_eq!(stats.failed_jobs, 2);
    }
}
