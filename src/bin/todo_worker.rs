//! Runs the completion worker against `PostgreSQL`, Redis, and `RabbitMQ`.
//!
//! Usage:
//!
//! ```text
//! todo_worker [--config <path>]
//! ```
//!
//! Settings come from the optional JSON file and `TODO_*` environment
//! variables. The worker stops on Ctrl-C or `SIGTERM` after finishing the
//! deliveries it already holds.

use clap::Parser;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use std::path::PathBuf;
use std::sync::Arc;
use todo_lifecycle::config::AppConfig;
use todo_lifecycle::telemetry::{TodoMetrics, init_tracing, install_prometheus_exporter};
use todo_lifecycle::todo::adapters::amqp::AmqpConnection;
use todo_lifecycle::todo::adapters::postgres::PostgresTodoRepository;
use todo_lifecycle::todo::adapters::redis::RedisCacheStore;
use todo_lifecycle::todo::services::TodoOrchestrator;
use todo_lifecycle::worker::CompletionWorker;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Parser)]
#[command(name = "todo_worker", about = "Applies requested todo completions")]
struct Cli {
    /// JSON configuration file layered under `TODO_*` environment variables.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    init_tracing(&config.telemetry.log_filter)?;

    let metrics = match config.telemetry.metrics_addr {
        Some(addr) => {
            install_prometheus_exporter(addr)?;
            info!(%addr, "prometheus exporter listening");
            TodoMetrics::register()
        }
        None => TodoMetrics::noop(),
    };

    let pool = Pool::builder()
        .max_size(config.database.max_connections)
        .build(ConnectionManager::<PgConnection>::new(
            config.database.url.clone(),
        ))?;
    let repository = Arc::new(PostgresTodoRepository::new(pool));
    let cache = Arc::new(RedisCacheStore::connect(&config.redis.url).await?);
    let connection = AmqpConnection::connect(config.rabbitmq.clone()).await?;
    let publisher = Arc::new(connection.publisher().await?);

    let orchestrator = TodoOrchestrator::new(
        repository,
        cache,
        publisher,
        Arc::new(DefaultClock),
        config.orchestrator_settings(),
    )
    .with_metrics(metrics.clone());
    let worker = CompletionWorker::new(Arc::new(orchestrator), config.worker_settings())
        .with_metrics(metrics);

    let shutdown = CancellationToken::new();
    tokio::spawn(forward_shutdown_signal(shutdown.clone()));

    let subscription = connection.subscribe().await?;
    let result = worker.run(subscription, shutdown).await;
    connection.close().await?;

    match result {
        Ok(summary) => {
            info!(
                acked = summary.acked,
                requeued = summary.requeued,
                rejected = summary.rejected,
                "todo worker exited"
            );
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "todo worker failed");
            Err(err.into())
        }
    }
}

async fn forward_shutdown_signal(shutdown: CancellationToken) {
    wait_for_signal().await;
    info!("shutdown requested");
    shutdown.cancel();
}

/// Waits for `listener` to report a signal.
///
/// A listener that fails to install never resolves, so the failure cannot be
/// mistaken for a shutdown request.
async fn signalled<F>(listener: F, name: &str)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(err) = listener.await {
        error!(error = %err, signal = name, "cannot listen for signal");
        std::future::pending::<()>().await;
    }
}

async fn ctrl_c() {
    signalled(tokio::signal::ctrl_c(), "Ctrl-C").await;
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                () = ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(err) => {
            error!(error = %err, "cannot listen for SIGTERM");
            ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    ctrl_c().await;
}
