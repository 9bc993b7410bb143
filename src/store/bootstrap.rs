//! Startup connection bootstrap.
//!
//! # Responsibilities
//! - Wait for the datastore with a bounded retry loop
//! - Provision the database and tables (idempotent)
//! - Hand back the process-wide `Store`
//!
//! # Design Decisions
//! - Probe failures are "not ready yet" and retried
//! - Provisioning failures are fatal and never retried: once the server
//!   answers, a failing DDL statement is a misconfiguration
//! - No sleep after the last failed probe

use thiserror::Error;

use crate::config::{BootstrapConfig, DatabaseConfig};
use crate::observability::metrics;
use crate::resilience::RetryPolicy;
use crate::store::probe::{SqlProbe, StoreProbe};
use crate::store::{schema, Store, StoreError};

/// Unrecoverable startup failures.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("datastore not reachable after {attempts} attempts: {last_error}")]
    Unreachable { attempts: u32, last_error: String },

    #[error("schema provisioning failed while trying to {step}: {source}")]
    Provisioning {
        step: &'static str,
        source: StoreError,
    },
}

/// Brings the datastore from "maybe not up yet" to a ready pool.
pub struct ConnectionBootstrapper<P = SqlProbe> {
    database: DatabaseConfig,
    policy: RetryPolicy,
    probe: P,
}

impl ConnectionBootstrapper<SqlProbe> {
    pub fn new(database: DatabaseConfig, bootstrap: &BootstrapConfig) -> Self {
        let probe = SqlProbe::for_server(
            &database,
            std::time::Duration::from_secs(bootstrap.probe_timeout_secs),
        );
        Self {
            database,
            policy: RetryPolicy::from_config(bootstrap),
            probe,
        }
    }
}

impl<P: StoreProbe> ConnectionBootstrapper<P> {
    /// Swap the connectivity probe.
    pub fn with_probe<Q: StoreProbe>(self, probe: Q) -> ConnectionBootstrapper<Q> {
        ConnectionBootstrapper {
            database: self.database,
            policy: self.policy,
            probe,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Wait for connectivity, then provision.
    pub async fn bootstrap(&self) -> Result<Store, BootstrapError> {
        self.wait_until_ready().await?;
        self.provision().await
    }

    /// Probe until the datastore answers. Returns the attempt that succeeded.
    pub async fn wait_until_ready(&self) -> Result<u32, BootstrapError> {
        let max_attempts = self.policy.max_attempts;
        tracing::info!(max_attempts, "Waiting for datastore to become available");

        let mut last_error = String::from("no probe attempted");
        for attempt in 1..=max_attempts {
            tracing::debug!(attempt, max_attempts, "bootstrap attempt");

            match self.probe.probe().await {
                Ok(()) => {
                    metrics::record_bootstrap_attempt("success");
                    tracing::info!(attempt, "store reachable");
                    return Ok(attempt);
                }
                Err(e) => {
                    metrics::record_bootstrap_attempt("failure");
                    tracing::warn!(attempt, error = %e, "store not ready");
                    last_error = e.to_string();
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.policy.delay_after(attempt)).await;
            }
        }

        tracing::error!(attempts = max_attempts, error = %last_error, "store unreachable after retries");
        Err(BootstrapError::Unreachable {
            attempts: max_attempts,
            last_error,
        })
    }

    /// Create the database and tables if absent, and open the pool.
    pub async fn provision(&self) -> Result<Store, BootstrapError> {
        tracing::info!(database = %self.database.name, "Ensuring database exists");
        schema::ensure_database(&self.database)
            .await
            .map_err(|source| fatal("create the database", source))?;
        tracing::info!(database = %self.database.name, "database ensured");

        let store = Store::connect(&self.database)
            .await
            .map_err(|source| fatal("open the connection pool", source))?;

        schema::ensure_tables(&store)
            .await
            .map_err(|source| fatal("create tables", source))?;
        tracing::info!("tables ensured");

        Ok(store)
    }
}

fn fatal(step: &'static str, source: StoreError) -> BootstrapError {
    tracing::error!(step, error = %source, "Schema provisioning failed");
    BootstrapError::Provisioning { step, source }
}
