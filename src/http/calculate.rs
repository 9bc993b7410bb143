//! Calculation and health endpoints.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::http::response::{ApiError, CalculationResponse, HealthResponse};
use crate::http::server::AppState;
use crate::store::OperationKind;

/// Query string of `POST /add`.
#[derive(Debug, Deserialize)]
pub struct OperandPair {
    pub a: f64,
    pub b: f64,
}

pub async fn add(
    State(state): State<AppState>,
    params: Result<Query<OperandPair>, QueryRejection>,
) -> Result<Json<CalculationResponse>, ApiError> {
    let Query(pair) = params.map_err(|rejection| ApiError::InvalidInput(rejection.body_text()))?;

    let result = state
        .operations
        .execute(OperationKind::Add, pair.a, pair.b)
        .await?;

    Ok(Json(CalculationResponse { result }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.operations.store().ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ok" })),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(HealthResponse { status: "unavailable" }))
        }
    }
}
