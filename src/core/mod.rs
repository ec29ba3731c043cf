//! Core abstractions: jobs, the worker pool, cancellation and admission.

pub mod cancel;
pub mod error;
pub(crate) mod executor;
pub mod job;
pub mod model;
pub mod rate_limit;
pub mod worker_pool;

pub use cancel::CancellationSignal;
pub use error::{AppResult, EmailError, JobError, PushError, RenderError};
pub use job::{EmailJob, EmailSender, Job, Notification, Process, PushChannel, ReportJob, ReportRenderer};
pub use model::{Todo, TodoId, User, UserId};
pub use rate_limit::{CounterStore, FixedWindowLimiter, RateLimitError, RateLimiter, StoreError};
pub use worker_pool::{PoolError, PoolStats, WorkerPool};
