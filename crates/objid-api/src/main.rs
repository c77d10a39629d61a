//! objid server binary.
//!
//! Serves the object ID HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # With config file
//! objid --config objid.yaml
//!
//! # With environment variables only
//! OBJID_SERVER__PORT=9090 objid
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use objid_api::http::{create_router_with_options, AppState, MetricsEndpoint, RouterOptions};
use objid_api::middleware::{with_middleware, RequestMetrics};
use objid_api::observability::{init_logging, init_metrics, LoggingConfig};
use objid_server::{ServerConfig, StorageBackend};
use objid_storage::{BlobStore, MemoryBlobStore};

/// objid - object ID allocation service
#[derive(Parser, Debug)]
#[command(name = "objid")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match args.config {
        Some(config_path) => ServerConfig::load(&config_path)?,
        None => ServerConfig::from_env()?,
    };

    init_logging(&LoggingConfig::from(&config.logging))?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting objid server");

    let addr: SocketAddr = config.server.listen_address().parse()?;

    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage backend");
            run_server(MemoryBlobStore::new_shared(), addr, &config).await
        }
    }
}

/// Builds the application and serves it until a shutdown signal arrives.
async fn run_server<S: BlobStore>(
    storage: Arc<S>,
    addr: SocketAddr,
    config: &ServerConfig,
) -> anyhow::Result<()> {
    let state = AppState::with_cache_config(storage, config.cache.to_cache_config());
    let metrics = if config.metrics.enabled {
        info!(path = %config.metrics.path, "Metrics enabled");
        Some(MetricsEndpoint::new(init_metrics()?).at(config.metrics.path.as_str()))
    } else {
        info!("Metrics disabled");
        None
    };
    let options = RouterOptions {
        body_limit: config.server.body_limit_bytes,
        metrics,
    };
    let router = with_middleware(
        create_router_with_options(state, options),
        Arc::new(RequestMetrics::new()),
    );

    info!(%addr, "HTTP server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
