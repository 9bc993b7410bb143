//! Scoped transactional sessions.
//!
//! # Contract
//! ```text
//! with_session(work):
//!     acquire connection + BEGIN
//!     work(&mut session)
//!       Ok  → COMMIT   → release
//!       Err → ROLLBACK → release → return the original error
//! ```
//!
//! Release is tied to ownership: `Session` owns the transaction and a
//! `SessionGuard`, and both `commit` and `rollback` consume it. A panic inside
//! `work` drops the session, which rolls back and releases as well.

use futures_util::future::BoxFuture;
use sqlx::{Any, AnyConnection, Transaction};

use crate::observability::metrics;
use crate::store::{SessionGuard, Store, StoreError};

/// A transaction checked out for one unit of work.
///
/// Only `Store::with_session` creates these; it never outlives the call.
pub struct Session {
    tx: Transaction<'static, Any>,
    _guard: SessionGuard,
}

impl Session {
    /// Executor for queries inside this transaction.
    pub fn connection(&mut self) -> &mut AnyConnection {
        &mut *self.tx
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

impl Store {
    /// Run `work` inside a fresh transaction.
    ///
    /// Commits when `work` returns `Ok`, rolls back and propagates the error
    /// when it returns `Err`. The connection goes back to the pool exactly
    /// once on every path.
    pub async fn with_session<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, Result<T, E>>,
        E: From<StoreError>,
    {
        let tx = self.pool().begin().await.map_err(StoreError::from)?;
        let mut session = Session {
            tx,
            _guard: self.track_session(),
        };
        tracing::debug!("DB_SESSION_OPENED");

        let outcome = work(&mut session).await;

        let result = match outcome {
            Ok(value) => match session.commit().await {
                Ok(()) => {
                    tracing::debug!("DB_SESSION_COMMIT");
                    metrics::record_session("commit");
                    Ok(value)
                }
                Err(e) => {
                    tracing::error!(error = %e, "DB_SESSION_COMMIT failed");
                    metrics::record_session("commit_failed");
                    Err(E::from(e))
                }
            },
            Err(err) => {
                tracing::error!("DB_SESSION_ROLLBACK");
                metrics::record_session("rollback");
                if let Err(e) = session.rollback().await {
                    // The connection is dropped instead of reused; the server discards the transaction.
                    tracing::warn!(error = %e, "Rollback failed");
                }
                Err(err)
            }
        };

        tracing::debug!("DB_SESSION_CLOSED");
        result
    }
}
