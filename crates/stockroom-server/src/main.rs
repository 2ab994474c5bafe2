//! Stockroom Server - Main entry point

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use stockroom_common::logging::{init_logging, LogConfig};
use stockroom_server::{
    api,
    config::{Config, StoreKind},
    db::{self, DbConfig},
    features::FeatureState,
    storage::SealStorage,
    store::{DynStore, MemoryStore, PgStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("stockroom-server")
        .filter_directives("stockroom_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;

    // Dropping the guard stops the file writer
    let _log_guard = init_logging(&log_config)?;

    info!("Starting Stockroom server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let store = open_store(&config).await?;
    let seals = SealStorage::from_config(&config.seal);
    info!(
        store = store.backend(),
        seal_dir = %seals.dir().display(),
        "Ledger ready"
    );

    let state = FeatureState::new(store, seals);
    api::serve(&config, state, shutdown_signal(config.server.shutdown_timeout_secs)).await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Connect the configured store, running migrations for PostgreSQL
async fn open_store(config: &Config) -> Result<DynStore> {
    match config.store {
        StoreKind::Postgres => {
            let pool = db::create_pool(&DbConfig::from(&config.database))
                .await
                .context("Failed to create database pool")?;
            info!("Database connection pool established");

            let store = PgStore::new(pool);
            store
                .migrate()
                .await
                .context("Failed to run migrations")?;
            info!("Database migrations completed");

            Ok(Arc::new(store))
        },
        StoreKind::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        },
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
