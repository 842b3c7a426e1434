//! OKR API Server
//!
//! Main entry point for the OKR engine service. With
//! `storage.snapshot_path` set, state is loaded from that file at startup
//! (when it exists) and written back on graceful shutdown.

use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use okrs_api::{AppState, create_router};
use okrs_core::OkrService;
use okrs_db::{MemoryStore, Snapshot};
use okrs_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "okrs=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    let snapshot_path = config.storage.snapshot_path.clone();

    let store = match &snapshot_path {
        Some(path) if tokio::fs::try_exists(path).await? => {
            Arc::new(MemoryStore::from_snapshot(Snapshot::load(path).await?)?)
        }
        Some(path) => {
            warn!(path = %path, "Snapshot not found, starting with an empty store");
            Arc::new(MemoryStore::new())
        }
        None => {
            info!("Starting with an empty store; state is not persisted");
            Arc::new(MemoryStore::new())
        }
    };

    let service = OkrService::new(store.clone(), &config.engine);
    info!(lock_timeout_ms = config.engine.lock_timeout_ms, "Engine configured");

    let app = create_router(AppState::new(service));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(path) = snapshot_path {
        store.snapshot().await.save(Path::new(&path)).await?;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
