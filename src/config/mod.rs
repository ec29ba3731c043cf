//! Configuration models for the server, pool, limiter and collaborators.

pub mod app;
pub mod pool;

pub use app::{AppConfig, AuthConfig, ConfigError, ServerConfig, SmtpConfig, StorageConfig};
pub use pool::{RateLimitConfig, WorkerPoolConfig};
