//! Datastore subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (bootstrap.rs):
//!     probe.rs (SELECT 1, retried) → schema.rs (CREATE DATABASE / TABLE IF NOT EXISTS)
//!     → Store (owned pool handle, injected into the HTTP state)
//!
//! Per request (session.rs):
//!     Store::with_session → begin → caller logic → commit | rollback → release
//!     → records.rs (insert / read calculation rows)
//! ```
//!
//! # Design Decisions
//! - One pool per process, created by the bootstrapper and passed explicitly
//! - `sqlx::Any` so the same code runs on MySQL in production and SQLite in tests
//! - Every transaction goes through `with_session`; nothing else calls `begin()`

pub mod bootstrap;
pub mod probe;
pub mod records;
pub mod schema;
pub mod session;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use thiserror::Error;

use crate::config::{DatabaseConfig, StoreDriver};

pub use bootstrap::{BootstrapError, ConnectionBootstrapper};
pub use probe::{SqlProbe, StoreProbe};
pub use records::{CalculationRecord, NewCalculation, OperationKind};
pub use session::Session;

/// Errors raised by datastore operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("unreadable row: {0}")]
    Decode(String),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle to the process-wide connection pool.
///
/// Cheap to clone; all clones share the pool and the open-session counter.
#[derive(Debug, Clone)]
pub struct Store {
    pool: AnyPool,
    driver: StoreDriver,
    open_sessions: Arc<AtomicUsize>,
}

impl Store {
    /// Open a pool against the configured target database.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.database_url())
            .await?;

        tracing::info!(
            driver = ?config.driver,
            database = %config.name,
            max_connections = config.max_connections,
            "Connection pool ready"
        );

        Ok(Self {
            pool,
            driver: config.driver,
            open_sessions: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn driver(&self) -> StoreDriver {
        self.driver
    }

    /// Number of sessions currently checked out through `with_session`.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    /// Lightweight connectivity check through the pool.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to come back.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Connection pool closed");
    }

    fn track_session(&self) -> SessionGuard {
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        SessionGuard {
            open_sessions: self.open_sessions.clone(),
        }
    }
}

/// A RAII guard that keeps the open-session count honest.
#[derive(Debug)]
struct SessionGuard {
    open_sessions: Arc<AtomicUsize>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}
