//! # BoxHire Worker
//!
//! Runs the job expiry sweep until Ctrl-C.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/boxhire SWEEP_INTERVAL_SECS=30 \
//! cargo run -p boxhire-worker
//! ```

use boxhire_shared::db::pool::{close_pool, create_pool, DatabaseConfig};
use boxhire_worker::{config::WorkerConfig, sweeper::JobExpirySweeper};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boxhire_worker=debug,boxhire_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "BoxHire Worker v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = WorkerConfig::from_env()?;

    let pool = create_pool(DatabaseConfig {
        max_connections: config.max_connections,
        min_connections: 0,
        ..DatabaseConfig::with_url(config.database_url.clone())
    })
    .await?;

    let sweeper = JobExpirySweeper::new(pool.clone(), config.sweep_interval);
    let shutdown = sweeper.shutdown_token();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
        tracing::info!("Shutdown signal received");
        shutdown.cancel();
    });

    sweeper.run().await;

    close_pool(pool).await;
    tracing::info!("Worker stopped");

    Ok(())
}
