//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, worker spawning, and Axum server lifecycle.

use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::domain::clock::SystemClock;
use crate::infrastructure::cache::{MemoryCache, RedisCache, run_purge_loop};
use crate::infrastructure::persistence::PgShortLinkRepository;
use crate::routes::app_router;
use crate::state::{AppState, Backends, ServiceSettings};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Time allowed for queued clicks to drain after the server stops.
const CLICK_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// How often the in-process store drops expired keys.
const MEMORY_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (retried with jittered backoff)
/// - Apply migrations
/// - Redis cache (or in-process fallback with a periodic expiry sweep)
/// - Background click worker
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let clock = Arc::new(SystemClock);
    let repository = Arc::new(PgShortLinkRepository::new(Arc::new(pool)));

    let backends = match connect_cache(&config).await {
        Some(redis) => {
            let redis = Arc::new(redis);
            Backends {
                repository: repository.clone(),
                store_health: repository.clone(),
                cache: redis.clone(),
                windows: redis.clone(),
                cache_health: redis,
                clock,
            }
        }
        None => {
            let memory = Arc::new(MemoryCache::with_clock(clock.clone()));
            tokio::spawn(run_purge_loop(memory.clone(), MEMORY_PURGE_INTERVAL));
            Backends {
                repository: repository.clone(),
                store_health: repository.clone(),
                cache: memory.clone(),
                windows: memory.clone(),
                cache_health: memory,
                clock,
            }
        }
    };

    let (state, click_rx) = AppState::new(backends, ServiceSettings::from(&config));

    let worker = tokio::spawn(run_click_worker(
        click_rx,
        repository,
        config.click_worker_concurrency,
    ));
    tracing::info!(
        concurrency = config.click_worker_concurrency,
        "Click worker started"
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router and every click sender are gone now, so the worker drains the
    // queue, waits for its in-flight increments and exits.
    match tokio::time::timeout(CLICK_DRAIN_TIMEOUT, worker).await {
        Ok(_) => tracing::info!("Click queue drained"),
        Err(_) => tracing::warn!("Timed out waiting for click queue to drain"),
    }

    Ok(())
}

/// Opens the connection pool, retrying while the database comes up.
async fn connect_database(config: &Config) -> Result<PgPool> {
    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    let strategy = ExponentialBackoff::from_millis(100)
        .max_delay(Duration::from_secs(5))
        .map(jitter)
        .take(5);

    Retry::spawn(strategy, || {
        let options = options.clone();
        async move {
            options.connect(&config.database_url).await.inspect_err(|e| {
                tracing::warn!(error = %e, "Database connection attempt failed");
            })
        }
    })
    .await
    .context("Failed to connect to database")
}

/// Connects to Redis if configured. Falls back to the in-process store otherwise.
async fn connect_cache(config: &Config) -> Option<RedisCache> {
    let redis_url = match &config.redis_url {
        Some(url) => url,
        None => {
            tracing::info!("Redis not configured, using in-process cache");
            return None;
        }
    };

    match RedisCache::connect(redis_url).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Some(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using in-process cache.", e);
            None
        }
    }
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
