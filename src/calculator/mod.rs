//! Calculation operations.
//!
//! # Data Flow
//! ```text
//! operands → validate (finite) → compute → Store::with_session → records::insert
//! ```
//!
//! Validation happens before a session is opened, so rejected input never
//! touches the datastore.

use thiserror::Error;

use crate::store::records::{self, NewCalculation, OperationKind};
use crate::store::{Store, StoreError};

/// Errors from executing an operation.
#[derive(Debug, Error)]
pub enum CalcError {
    /// Caller supplied a NaN or infinite operand.
    #[error("operand {name} must be a finite number, got {value}")]
    InvalidOperand { name: &'static str, value: f64 },

    /// Finite operands whose result does not fit in an f64. Not the caller's fault.
    #[error("result of {operation} is not a finite number")]
    ResultOutOfRange { operation: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CalcError {
    /// True when the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, CalcError::InvalidOperand { .. })
    }
}

/// Executes operations and records each one.
#[derive(Debug, Clone)]
pub struct OperationHandler {
    store: Store,
}

impl OperationHandler {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Validate, compute, persist one record, return the result.
    pub async fn execute(&self, operation: OperationKind, a: f64, b: f64) -> Result<f64, CalcError> {
        tracing::info!(operation = operation.as_str(), a, b, "USER_ACTION");

        let outcome = self.compute_and_record(operation, a, b).await;
        match &outcome {
            Ok(result) => tracing::info!(result, "ADD_SUCCESS"),
            Err(e) if e.is_client_error() => tracing::warn!(error = %e, "Rejected operands"),
            Err(e) => tracing::error!(error = %e, "ADD_FAILED"),
        }
        outcome
    }

    async fn compute_and_record(&self, operation: OperationKind, a: f64, b: f64) -> Result<f64, CalcError> {
        ensure_finite("a", a)?;
        ensure_finite("b", b)?;

        let result = operation.apply(a, b);
        if !result.is_finite() {
            return Err(CalcError::ResultOutOfRange {
                operation: operation.as_str(),
            });
        }

        let calculation = NewCalculation {
            operation,
            operand1: a,
            operand2: b,
            result,
        };
        self.store
            .with_session(move |session| {
                Box::pin(async move {
                    records::insert(session, &calculation).await?;
                    Ok::<_, CalcError>(())
                })
            })
            .await?;

        Ok(result)
    }
}

fn ensure_finite(name: &'static str, value: f64) -> Result<(), CalcError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CalcError::InvalidOperand { name, value })
    }
}
