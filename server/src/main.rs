//! Conference Central HTTP server.

use axum::{Router, routing::get};
use conference_core::announcement::AnnouncementRefresher;
use conference_core::environment::SystemClock;
use conference_core::store::{AnnouncementCache, EntityStore};
use conference_postgres::PostgresEntityStore;
use conference_runtime::RetryPolicy;
use conference_runtime::metrics::MetricsServer;
use conference_server::{
    app::{ChannelTaskQueue, ConferenceService, TaskRunner, spawn_announcement_scheduler, spawn_worker},
    auth::{Authenticator, RedisIdentityProvider},
    cache::RedisAnnouncementCache,
    config::Config,
    email::ConsoleEmailProvider,
    server::{AppState, PostgresProbe, RedisProbe, build_router},
};
use conference_web::handlers::health::Readiness;
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,conference_server=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Conference Central HTTP Server");

    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr(),
        metrics_addr = %config.metrics_addr(),
        redis_url = %config.redis.url,
        "Configuration loaded"
    );

    // Metrics recorder
    let mut metrics_server = MetricsServer::new(config.metrics_addr().parse()?);
    metrics_server.start()?;

    // Entity store
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .min_connections(config.postgres.min_connections)
        .acquire_timeout(Duration::from_secs(config.postgres.connect_timeout))
        .connect(&config.postgres.url)
        .await?;
    let postgres = PostgresEntityStore::new(pool.clone());
    postgres.migrate().await?;
    let store: Arc<dyn EntityStore> = Arc::new(postgres);
    info!("Database connected and migrated");

    // Announcement cache and identity lookup share one Redis connection
    info!("Connecting to Redis...");
    let conn_manager = ConnectionManager::new(redis::Client::open(config.redis.url.as_str())?).await?;
    let cache: Arc<dyn AnnouncementCache> =
        Arc::new(RedisAnnouncementCache::from_manager(conn_manager.clone()));
    let identity = Arc::new(RedisIdentityProvider::new(conn_manager.clone()));
    info!("Redis connected");

    // Background work
    let (queue, receiver) = ChannelTaskQueue::new(config.tasks.queue_capacity);
    let runner = TaskRunner::new(
        AnnouncementRefresher::new(Arc::clone(&store), Arc::clone(&cache)),
        Arc::new(ConsoleEmailProvider::new(config.tasks.email_from.clone())),
    );
    let worker = spawn_worker(receiver, runner.clone());
    let scheduler =
        spawn_announcement_scheduler(runner.clone(), config.announcement_refresh_interval());

    let retry = RetryPolicy::builder()
        .max_retries(config.postgres.transaction_max_retries)
        .build();
    let service = Arc::new(
        ConferenceService::new(Arc::clone(&store), cache, Arc::new(queue)).with_retry_policy(retry),
    );

    if config.auth.test_token.is_some() {
        warn!("AUTH_TEST_TOKEN is set: requests bearing it are accepted as the test user");
    }
    let authenticator =
        Authenticator::new(identity).with_test_token(config.auth.test_token.clone());

    let readiness = Readiness::new(Arc::new(SystemClock))
        .with_probe(Arc::new(PostgresProbe::new(pool)))
        .with_probe(Arc::new(RedisProbe::new(conn_manager)));

    let state = AppState::new(Arc::clone(&service), Arc::new(authenticator), runner, readiness)
        .with_task_token(config.auth.task_token.clone())
        .with_metrics(metrics_server.handle());

    // Dedicated scrape listener
    if let Some(handle) = metrics_server.handle() {
        let metrics_listener = tokio::net::TcpListener::bind(config.metrics_addr()).await?;
        let metrics_app = Router::new().route(
            "/metrics",
            get(move || {
                let handle = handle.clone();
                async move { handle.render() }
            }),
        );
        tokio::spawn(async move {
            if let Err(e) = axum::serve(metrics_listener, metrics_app).await {
                error!(error = %e, "Metrics listener failed");
            }
        });
        info!(addr = %metrics_server.addr(), "Metrics listener started");
    }

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %config.bind_addr(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain post-commit effects and queued tasks, bounded by the shutdown timeout
    let timeout = config.shutdown_timeout();
    scheduler.abort();
    if !service.effects().wait_idle(timeout).await {
        warn!(pending = service.effects().pending(), "Effects still running at shutdown");
    }
    drop(service);
    if tokio::time::timeout(timeout, worker).await.is_err() {
        warn!("Task worker did not drain before the shutdown timeout");
    }

    info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
