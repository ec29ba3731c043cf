//! Shared handler state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::core::job::{EmailSender, ReportRenderer};
use crate::core::rate_limit::RateLimiter;
use crate::core::worker_pool::WorkerPool;
use crate::infra::{
    InMemoryTodoRepository, InMemoryUserRepository, LogEmailSender, NotificationHub, PdfRenderer,
};
use crate::service::{JwtService, TodoService, TokenService, UserService};

/// Everything a handler can reach. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Todo use cases.
    pub todos: TodoService,
    /// User use cases.
    pub users: UserService,
    /// Bearer token issuance and validation.
    pub tokens: Arc<dyn TokenService>,
    /// Admission gate for protected routes.
    pub limiter: Arc<dyn RateLimiter>,
    /// Background job pool.
    pub pool: Arc<WorkerPool>,
    /// Email capability handed to email jobs.
    pub email: Arc<dyn EmailSender>,
    /// Renderer handed to report jobs.
    pub renderer: Arc<dyn ReportRenderer>,
    /// Push fan-out for report completion notices.
    pub hub: NotificationHub,
    /// Directory reports are served from.
    pub reports_dir: PathBuf,
    /// Directory holding `index.html`.
    pub html_assets_path: PathBuf,
}

impl AppState {
    /// Wire in-memory repositories and the default collaborators from `config`.
    pub fn from_config(config: &AppConfig, pool: Arc<WorkerPool>, limiter: Arc<dyn RateLimiter>) -> Self {
        let tokens = JwtService::new(
            &config.auth.jwt_secret,
            Duration::from_secs(config.auth.token_ttl_secs),
        );
        Self {
            todos: TodoService::new(Arc::new(InMemoryTodoRepository::new())),
            users: UserService::new(Arc::new(InMemoryUserRepository::new())).with_cost(config.auth.password_cost),
            tokens: Arc::new(tokens),
            limiter,
            pool,
            email: Arc::new(LogEmailSender::new(&config.smtp)),
            renderer: Arc::new(PdfRenderer::new(&config.storage.pdf_output_path)),
            hub: NotificationHub::default(),
            reports_dir: config.storage.pdf_output_path.clone(),
            html_assets_path: config.server.html_assets_path.clone(),
        }
    }
}
