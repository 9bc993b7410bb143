//! Datastore connectivity probe.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use sqlx::{AnyConnection, Connection};

use crate::config::{DatabaseConfig, StoreDriver};
use crate::store::StoreError;

/// A one-shot readiness check against the datastore.
///
/// Implementations must not leave anything behind: no pooled connections,
/// no files, no schema changes.
pub trait StoreProbe: Send + Sync {
    fn probe(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

#[derive(Debug, Clone)]
enum Target {
    Server { url: String },
    /// Until the file exists only its directory can be checked.
    SqliteFile { path: PathBuf, url: String },
}

/// Probe that opens a single connection to the server and runs `SELECT 1`.
#[derive(Debug, Clone)]
pub struct SqlProbe {
    target: Target,
    timeout: Duration,
}

impl SqlProbe {
    /// Probe the server URL (no database selected) from the config.
    pub fn for_server(config: &DatabaseConfig, timeout: Duration) -> Self {
        let target = match config.driver {
            StoreDriver::MySql => Target::Server {
                url: config.server_url(),
            },
            StoreDriver::Sqlite => Target::SqliteFile {
                path: config.sqlite_file(),
                url: config.server_url(),
            },
        };
        Self { target, timeout }
    }

    async fn check(&self) -> Result<(), StoreError> {
        match &self.target {
            Target::Server { url } => select_one(url).await,
            Target::SqliteFile { path, url } => {
                if tokio::fs::try_exists(path).await? {
                    select_one(url).await
                } else {
                    directory_ready(path).await
                }
            }
        }
    }
}

impl StoreProbe for SqlProbe {
    async fn probe(&self) -> Result<(), StoreError> {
        tokio::time::timeout(self.timeout, self.check())
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
    }
}

async fn select_one(url: &str) -> Result<(), StoreError> {
    sqlx::any::install_default_drivers();

    let mut conn = AnyConnection::connect(url).await?;
    sqlx::query("SELECT 1").execute(&mut conn).await?;
    conn.close().await?;
    Ok(())
}

async fn directory_ready(file: &std::path::Path) -> Result<(), StoreError> {
    let dir = file.parent().unwrap_or_else(|| std::path::Path::new("."));
    let metadata = tokio::fs::metadata(dir).await?;
    if metadata.is_dir() {
        Ok(())
    } else {
        Err(StoreError::Io(std::io::Error::other(format!(
            "{} is not a directory",
            dir.display()
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{sqlite_config, sqlite_store};

    #[tokio::test]
    async fn test_readiness_check_leaves_no_database_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let config = sqlite_config(&dir);
        let probe = SqlProbe::for_server(&config, Duration::from_secs(5));

        probe.probe().await.unwrap();

        assert!(!config.sqlite_file().exists());
    }

    #[tokio::test]
    async fn test_existing_database_answers_select() {
        let (store, dir) = sqlite_store().await;
        let config = sqlite_config(&dir);
        let probe = SqlProbe::for_server(&config, Duration::from_secs(5));

        probe.probe().await.unwrap();
        store.close().await;
    }

    #[tokio::test]
    async fn test_file_in_place_of_directory_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let mut config = sqlite_config(&dir);
        config.host = blocker.display().to_string();

        let probe = SqlProbe::for_server(&config, Duration::from_secs(5));
        assert!(matches!(probe.probe().await, Err(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn test_missing_directory_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = sqlite_config(&dir);
        config.host = dir.path().join("does/not/exist").display().to_string();

        let probe = SqlProbe::for_server(&config, Duration::from_secs(5));
        assert!(probe.probe().await.is_err());
    }
}
