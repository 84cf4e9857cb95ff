//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Open the ledger database
//! - Start the metrics exporter and admin API when enabled
//! - Bind the proxy listener and serve until a signal arrives

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::admin::{setup_admin_router, AdminState};
use crate::config::watcher::ConfigWatcher;
use crate::config::{load_config, ConfigError, ProxyConfig};
use crate::http::HttpServer;
use crate::lifecycle::signals::wait_for_signal;
use crate::lifecycle::Shutdown;
use crate::observability::{logging, metrics};
use crate::storage::{Database, StorageError};
use crate::upstream::ForwardError;

/// Path value selecting a throwaway in-memory database.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to open database: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to build upstream client: {0}")]
    Forwarder(#[from] ForwardError),

    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to watch config file: {0}")]
    Watch(#[from] notify::Error),
}

/// Open the configured database.
pub fn open_database(path: &str) -> Result<Database, StorageError> {
    if path == IN_MEMORY_DATABASE {
        Database::memory()
    } else {
        Database::open(Path::new(path))
    }
}

/// Run the proxy until SIGINT or SIGTERM.
pub async fn run(config_path: Option<PathBuf>) -> Result<(), StartupError> {
    let config = load_config(config_path.as_deref())?;
    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        act_as_server = config.intercept.act_as_server,
        fake_ticket = config.intercept.fake_ticket,
        "ticket-edge starting"
    );

    let db = open_database(&config.storage.database_path)?;
    tracing::info!(path = %config.storage.database_path, "Database opened");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config.clone(), db)?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    if config.admin.enabled {
        spawn_admin(&config, &server, &shutdown).await?;
    }

    // The watcher stops when dropped, so it lives until `run` returns.
    let (_watcher, config_updates) = match config_path {
        Some(path) => {
            let (watcher, rx) = ConfigWatcher::new(&path);
            (Some(watcher.run()?), rx)
        }
        None => {
            let (_tx, rx) = mpsc::unbounded_channel();
            (None, rx)
        }
    };

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    server
        .run(listener, config_updates, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn spawn_admin(
    config: &ProxyConfig,
    server: &HttpServer,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    let state = AdminState::from_app(server.state(), &config.admin.api_key);
    let router = setup_admin_router(state);
    let listener = TcpListener::bind(&config.admin.bind_address).await?;
    tracing::info!(address = %config.admin.bind_address, "Admin API listening");

    let mut stop = shutdown.subscribe();
    tokio::spawn(async move {
        let served = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await;
        if let Err(e) = served {
            tracing::error!(error = %e, "Admin API failed");
        }
    });
    Ok(())
}
