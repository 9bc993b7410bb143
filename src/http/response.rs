//! Response payloads and error mapping.
//!
//! # Design Decisions
//! - Every error body is `{"detail": "..."}`
//! - Client faults carry a descriptive detail (422)
//! - Server faults carry a fixed detail (500); the cause is logged, never returned

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::calculator::CalcError;

pub const INTERNAL_ERROR_DETAIL: &str = "Internal server error";

/// Successful calculation body.
#[derive(Debug, Serialize, Deserialize)]
pub struct CalculationResponse {
    pub result: f64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Errors surfaced to HTTP callers.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or out-of-domain input.
    InvalidInput(String),
    /// Anything else; details stay in the logs.
    Internal,
}

impl From<CalcError> for ApiError {
    fn from(err: CalcError) -> Self {
        if err.is_client_error() {
            ApiError::InvalidInput(err.to_string())
        } else {
            ApiError::Internal
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::InvalidInput(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_DETAIL.to_string()),
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_store_errors_do_not_leak_detail() {
        let err: ApiError = CalcError::Store(StoreError::Decode("secret table layout".into())).into();
        assert!(matches!(err, ApiError::Internal));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_invalid_operand_is_unprocessable() {
        let err: ApiError = CalcError::InvalidOperand { name: "a", value: f64::NAN }.into();
        match &err {
            ApiError::InvalidInput(detail) => assert!(detail.contains("operand a")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
