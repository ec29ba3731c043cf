//! Todo HTTP server with background workers.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use todo_taskq::config::AppConfig;
use todo_taskq::core::{AppResult, CancellationSignal, CounterStore, FixedWindowLimiter, RateLimiter, WorkerPool};
use todo_taskq::infra::InMemoryCounterStore;
use todo_taskq::runtime::{build_router, shutdown_signal, AppState};
use todo_taskq::util::init_tracing;

#[derive(Debug, Parser)]
#[command(name = "todo-server", version, about = "Todo service with background job workers")]
struct Args {
    /// Path to the JSON configuration file.
    #[arg(long, short, env = "TASKQ_CONFIG", default_value = "config.json")]
    config: PathBuf,
}

async fn counter_store(config: &AppConfig) -> AppResult<Arc<dyn CounterStore>> {
    match config.storage.redis_url.as_deref() {
        #[cfg(feature = "redis")]
        Some(url) => {
            let store = todo_taskq::infra::RedisCounterStore::connect(url)
                .await
                .context("failed to connect to redis")?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis"))]
        Some(_) => {
            warn!("redis_url set but built without the `redis` feature; using in-memory counters");
            Ok(Arc::new(InMemoryCounterStore::new()))
        }
        None => Ok(Arc::new(InMemoryCounterStore::new())),
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = AppConfig::from_file(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    let limiter: Arc<dyn RateLimiter> = Arc::new(FixedWindowLimiter::new(
        counter_store(&config).await?,
        config.rate_limit.limit,
        config.rate_limit.window(),
    ));

    let pool = Arc::new(WorkerPool::new(config.workers.clone())?);
    let signal = CancellationSignal::new();
    pool.start(signal.clone())?;

    let app = build_router(AppState::from_config(&config, Arc::clone(&pool), limiter));
    let listener = TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    info!(addr = %listener.local_addr()?, "server started");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("http server stopped, shutting down workers");
    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);
    let draining = tokio::task::spawn_blocking(move || pool.shutdown(&signal));
    match tokio::time::timeout(grace, draining).await {
        Ok(joined) => joined.context("worker shutdown task failed")?,
        Err(_) => warn!(timeout_secs = grace.as_secs(), "workers still busy at shutdown timeout; exiting"),
    }

    info!("server gracefully stopped");
    Ok(())
}
