#![allow(dead_code)]
//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use calc_service::config::{DatabaseConfig, ServiceConfig, StoreDriver};
use calc_service::lifecycle::{self, Shutdown, StartupError};
use calc_service::store::ConnectionBootstrapper;
use calc_service::Store;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A running service backed by a throwaway SQLite database.
pub struct TestService {
    pub addr: SocketAddr,
    pub store: Store,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), StartupError>>,
    _dir: tempfile::TempDir,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// SQLite database config rooted in `dir`.
pub fn sqlite_database(dir: &tempfile::TempDir) -> DatabaseConfig {
    DatabaseConfig {
        driver: StoreDriver::Sqlite,
        host: dir.path().display().to_string(),
        name: "calc_it".to_string(),
        max_connections: 8,
        ..DatabaseConfig::default()
    }
}

/// Bootstrap a store and serve the router on an ephemeral port.
pub async fn start_service() -> TestService {
    let dir = tempfile::tempdir().unwrap();

    let mut config = ServiceConfig::default();
    config.database = sqlite_database(&dir);
    config.bootstrap.interval_ms = 10;

    let store = ConnectionBootstrapper::new(config.database.clone(), &config.bootstrap)
        .bootstrap()
        .await
        .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    let server_store = store.clone();
    let handle = tokio::spawn(async move {
        lifecycle::serve(config, server_store, listener, &server_shutdown).await
    });

    TestService {
        addr,
        store,
        shutdown,
        handle,
        _dir: dir,
    }
}

/// Wait for dropped connections to be handed back to the pool.
pub async fn pool_settled(store: &Store) -> bool {
    for _ in 0..50 {
        if store.pool().num_idle() as u32 == store.pool().size() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
