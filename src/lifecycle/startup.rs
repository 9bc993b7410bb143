//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize metrics
//! - Bootstrap the datastore (wait, provision, open pool)
//! - Bind the listener only once the store is ready
//! - Close the pool after the server has drained
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::store::{BootstrapError, ConnectionBootstrapper, Store};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Bring the whole service up and run it until `shutdown` fires.
pub async fn start(config: ServiceConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse::<SocketAddr>() {
            metrics::init_metrics(addr);
        }
    }

    let store = ConnectionBootstrapper::new(config.database.clone(), &config.bootstrap)
        .bootstrap()
        .await?;

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    tracing::info!(
        address = %config.listener.bind_address,
        "Listening for connections"
    );

    serve(config, store, listener, shutdown).await
}

/// Serve on an already bound listener, then release the pool.
pub async fn serve(
    config: ServiceConfig,
    store: Store,
    listener: TcpListener,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    let server = HttpServer::new(config, store.clone());
    let result = server.run(listener, shutdown.subscribe()).await;
    store.close().await;
    result?;
    Ok(())
}
