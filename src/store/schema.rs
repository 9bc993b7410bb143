//! Idempotent schema provisioning.
//!
//! Both steps are safe to run on every start: they only create what is missing.

use sqlx::{AnyConnection, Connection};

use crate::config::{DatabaseConfig, StoreDriver};
use crate::store::{Store, StoreError};

const MYSQL_CALCULATIONS: &str = "CREATE TABLE IF NOT EXISTS calculations (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    operation VARCHAR(20) NOT NULL,
    operand1 DOUBLE NOT NULL,
    operand2 DOUBLE NOT NULL,
    result DOUBLE NOT NULL,
    created_at DATETIME(6) NOT NULL
)";

const SQLITE_CALCULATIONS: &str = "CREATE TABLE IF NOT EXISTS calculations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    operation TEXT NOT NULL,
    operand1 REAL NOT NULL,
    operand2 REAL NOT NULL,
    result REAL NOT NULL,
    created_at TEXT NOT NULL
)";

fn calculations_ddl(driver: StoreDriver) -> &'static str {
    match driver {
        StoreDriver::MySql => MYSQL_CALCULATIONS,
        StoreDriver::Sqlite => SQLITE_CALCULATIONS,
    }
}

/// Create the target database on the server if it does not exist yet.
///
/// SQLite creates the file on first connect, so this is a no-op there.
/// The name is interpolated; `validate_config` restricts it to `[A-Za-z0-9_]`.
pub async fn ensure_database(config: &DatabaseConfig) -> Result<(), StoreError> {
    if config.driver == StoreDriver::Sqlite {
        return Ok(());
    }

    sqlx::any::install_default_drivers();
    let mut conn = AnyConnection::connect(&config.server_url()).await?;
    let statement = format!("CREATE DATABASE IF NOT EXISTS `{}`", config.name);
    sqlx::query(&statement).execute(&mut conn).await?;
    conn.close().await?;
    Ok(())
}

/// Create the tables the service writes to.
pub async fn ensure_tables(store: &Store) -> Result<(), StoreError> {
    sqlx::query(calculations_ddl(store.driver()))
        .execute(store.pool())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::sqlite_store;

    #[tokio::test]
    async fn test_ensure_tables_is_idempotent() {
        let (store, _dir) = sqlite_store().await;

        ensure_tables(&store).await.unwrap();
        ensure_tables(&store).await.unwrap();

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'calculations'",
        )
        .fetch_one(store.pool())
        .await
        .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn test_ddl_matches_driver() {
        assert!(calculations_ddl(StoreDriver::MySql).contains("AUTO_INCREMENT"));
        assert!(calculations_ddl(StoreDriver::Sqlite).contains("AUTOINCREMENT"));
    }
}
