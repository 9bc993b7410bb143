//! Startup behavior against reachable and unreachable datastores.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use calc_service::config::{BootstrapConfig, DatabaseConfig, ServiceConfig, StoreDriver};
use calc_service::lifecycle::{self, Shutdown, StartupError};
use calc_service::resilience::RetryPolicy;
use calc_service::store::{records, BootstrapError, ConnectionBootstrapper, SqlProbe, StoreError, StoreProbe};

mod common;

/// Delegates to a real probe, but reports "down" for the first `down_for` calls.
struct FlakyProbe {
    inner: SqlProbe,
    calls: Arc<AtomicU32>,
    down_for: u32,
}

impl StoreProbe for FlakyProbe {
    async fn probe(&self) -> Result<(), StoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.down_for {
            return Err(StoreError::Timeout(Duration::from_millis(1)));
        }
        self.inner.probe().await
    }
}

fn unreachable_mysql() -> DatabaseConfig {
    DatabaseConfig {
        driver: StoreDriver::MySql,
        // Port 1 on loopback refuses connections immediately.
        host: "127.0.0.1:1".to_string(),
        ..DatabaseConfig::default()
    }
}

fn fast_bootstrap(max_attempts: u32) -> BootstrapConfig {
    BootstrapConfig {
        max_attempts,
        interval_ms: 10,
        probe_timeout_secs: 2,
        ..BootstrapConfig::default()
    }
}

#[tokio::test]
async fn test_store_that_comes_up_late_is_provisioned() {
    let dir = tempfile::tempdir().unwrap();
    let database = common::sqlite_database(&dir);
    let calls = Arc::new(AtomicU32::new(0));
    let probe = FlakyProbe {
        inner: SqlProbe::for_server(&database, Duration::from_secs(2)),
        calls: calls.clone(),
        down_for: 6,
    };

    let store = ConnectionBootstrapper::new(database, &fast_bootstrap(10))
        .with_probe(probe)
        .bootstrap()
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 7);
    assert_eq!(records::count(&store).await.unwrap(), 0);
}

#[tokio::test]
async fn test_repeated_bootstrap_keeps_existing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let database = common::sqlite_database(&dir);

    let first = ConnectionBootstrapper::new(database.clone(), &fast_bootstrap(3))
        .bootstrap()
        .await
        .unwrap();
    calc_service::calculator::OperationHandler::new(first.clone())
        .execute(records::OperationKind::Add, 1.0, 1.0)
        .await
        .unwrap();
    first.close().await;

    let second = ConnectionBootstrapper::new(database, &fast_bootstrap(3))
        .bootstrap()
        .await
        .unwrap();
    assert_eq!(records::count(&second).await.unwrap(), 1);
}

#[tokio::test]
async fn test_unreachable_store_exhausts_attempts() {
    let bootstrapper = ConnectionBootstrapper::new(unreachable_mysql(), &fast_bootstrap(3))
        .with_policy(RetryPolicy::fixed(3, Duration::from_millis(10)));

    let err = bootstrapper.bootstrap().await.unwrap_err();

    match err {
        BootstrapError::Unreachable { attempts, last_error } => {
            assert_eq!(attempts, 3);
            assert!(!last_error.is_empty());
        }
        other => panic!("expected Unreachable, got {other}"),
    }
}

#[tokio::test]
async fn test_unreachable_store_never_binds_listener() {
    let port_probe = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = port_probe.local_addr().unwrap();
    drop(port_probe);

    let mut config = ServiceConfig::default();
    config.database = unreachable_mysql();
    config.bootstrap = fast_bootstrap(2);
    config.listener.bind_address = addr.to_string();

    let result = lifecycle::start(config, &Shutdown::new()).await;

    assert!(matches!(
        result,
        Err(StartupError::Bootstrap(BootstrapError::Unreachable { attempts: 2, .. }))
    ));
    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}
