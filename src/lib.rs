//! # todo-taskq
//!
//! A todo service that keeps slow, fallible side-work (report generation,
//! email, notifications) off the request path.
//!
//! Two pieces carry the real concurrency contracts:
//!
//! - **Worker Pool**: a fixed set of OS-thread executors pulling [`Job`]s from
//!   one bounded FIFO queue, with cooperative shutdown driven by two
//!   independent signals (queue closure and a broadcast cancellation).
//! - **Admission Gate**: a fixed-window, per-identity rate limiter in front of
//!   every protected endpoint, backed by a pluggable counter store.
//!
//! Everything else (HTTP routing, token signing, password hashing, in-memory
//! repositories, PDF layout) is sequential glue around those two.
//!
//! ## Worker pool lifecycle
//!
//! ```rust,ignore
//! use todo_taskq::config::WorkerPoolConfig;
//! use todo_taskq::core::{CancellationSignal, Job, Notification, WorkerPool};
//!
//! let pool = WorkerPool::new(WorkerPoolConfig::new().with_worker_count(3))?;
//! let signal = CancellationSignal::new();
//! pool.start(signal.clone())?;
//!
//! pool.enqueue(Job::Notification(Notification::new("hello")))?;
//!
//! // Termination path: cancel, close, join. Exactly once.
//! pool.shutdown(&signal);
//! ```
//!
//! ## Admission gate
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use todo_taskq::core::{FixedWindowLimiter, RateLimiter};
//! use todo_taskq::infra::InMemoryCounterStore;
//!
//! let limiter = FixedWindowLimiter::new(
//!     Arc::new(InMemoryCounterStore::new()),
//!     100,
//!     Duration::from_secs(10),
//! );
//! let allowed = limiter.allow("42").await?;
//! ```
//!
//! [`Job`]: crate::core::Job

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core abstractions: jobs, the worker pool, cancellation and admission control.
pub mod core;
/// Configuration models for the server, pool, limiter and collaborators.
pub mod config;
/// Infrastructure adapters: counter stores, repositories, rendering, email, push.
pub mod infra;
/// Domain services sitting between the HTTP layer and the repositories.
pub mod service;
/// Runtime adapters: the axum HTTP surface and process signal handling.
pub mod runtime;
/// Shared utilities.
pub mod util;
