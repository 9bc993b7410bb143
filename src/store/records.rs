//! Calculation rows.
//!
//! Rows are append-only: this module inserts and reads, it never updates or deletes.

use serde::Serialize;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::store::{Session, Store, StoreError};

/// Column format for `created_at`; MySQL `DATETIME(6)` accepts and renders it.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]");

const INSERT_CALCULATION: &str =
    "INSERT INTO calculations (operation, operand1, operand2, result, created_at) VALUES (?, ?, ?, ?, ?)";

const SELECT_CALCULATIONS: &str = "SELECT id, operation, operand1, operand2, result, \
     CAST(created_at AS CHAR) FROM calculations ORDER BY id";

/// Supported arithmetic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Add,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Add => "add",
        }
    }

    /// Apply the operation.
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            OperationKind::Add => a + b,
        }
    }
}

impl std::str::FromStr for OperationKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(OperationKind::Add),
            other => Err(StoreError::Decode(format!("unknown operation '{}'", other))),
        }
    }
}

/// A calculation that has not been persisted yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewCalculation {
    pub operation: OperationKind,
    pub operand1: f64,
    pub operand2: f64,
    pub result: f64,
}

/// A committed calculation row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationRecord {
    pub id: i64,
    pub operation: OperationKind,
    pub operand1: f64,
    pub operand2: f64,
    pub result: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Insert one row inside the caller's session. `created_at` is stamped here, in UTC.
pub async fn insert(session: &mut Session, calculation: &NewCalculation) -> Result<(), StoreError> {
    let created_at = OffsetDateTime::now_utc()
        .format(TIMESTAMP_FORMAT)
        .map_err(|e| StoreError::Decode(e.to_string()))?;

    sqlx::query(INSERT_CALCULATION)
        .bind(calculation.operation.as_str())
        .bind(calculation.operand1)
        .bind(calculation.operand2)
        .bind(calculation.result)
        .bind(created_at)
        .execute(session.connection())
        .await?;
    Ok(())
}

/// Number of committed rows.
pub async fn count(store: &Store) -> Result<i64, StoreError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM calculations")
        .fetch_one(store.pool())
        .await?;
    Ok(total)
}

/// All committed rows, oldest first.
pub async fn list(store: &Store) -> Result<Vec<CalculationRecord>, StoreError> {
    let rows: Vec<(i64, String, f64, f64, f64, String)> = sqlx::query_as(SELECT_CALCULATIONS)
        .fetch_all(store.pool())
        .await?;

    rows.into_iter()
        .map(|(id, operation, operand1, operand2, result, created_at)| {
            let created_at = PrimitiveDateTime::parse(&created_at, TIMESTAMP_FORMAT)
                .map_err(|e| StoreError::Decode(format!("created_at '{}': {}", created_at, e)))?
                .assume_utc();
            Ok(CalculationRecord {
                id,
                operation: operation.parse()?,
                operand1,
                operand2,
                result,
                created_at,
            })
        })
        .collect()
}
