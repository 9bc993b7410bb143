//! Request lifecycle tracking.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) per inbound request
//! - Emit exactly one `REQUEST_START` and one `REQUEST_END` per request
//! - Measure wall-clock duration between the two
//! - Return the ID to the caller in `x-request-id`
//!
//! # Design Decisions
//! - `REQUEST_END` is owned by a drop guard, so it fires even when the inner
//!   future is dropped before producing a response
//! - Panics are turned into 500s by an inner stage and reach this one as responses
//! - This stage never alters the status of the response it observes

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request},
    http::{header::HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::observability::metrics;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation context of one request.
///
/// Emits `REQUEST_END` exactly once: via `finish`, or on drop if never finished.
struct Completion {
    id: Uuid,
    method: Method,
    started: Instant,
    span: tracing::Span,
    finished: bool,
}

impl Completion {
    fn start(id: Uuid, method: Method, span: tracing::Span) -> Self {
        Self {
            id,
            method,
            started: Instant::now(),
            span,
            finished: false,
        }
    }

    fn finish(mut self, status: StatusCode) {
        let elapsed = self.started.elapsed();
        self.span.in_scope(|| {
            tracing::info!(
                request_id = %self.id,
                status = status.as_u16(),
                duration_ms = duration_ms(elapsed),
                "REQUEST_END"
            );
        });
        metrics::record_request(self.method.as_str(), status.as_str(), elapsed);
        self.finished = true;
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let elapsed = self.started.elapsed();
        self.span.in_scope(|| {
            tracing::warn!(
                request_id = %self.id,
                status = "N/A",
                duration_ms = duration_ms(elapsed),
                "REQUEST_END"
            );
        });
        metrics::record_request(self.method.as_str(), "N/A", elapsed);
    }
}

/// Milliseconds rounded to two decimals.
fn duration_ms(elapsed: std::time::Duration) -> f64 {
    (elapsed.as_secs_f64() * 100_000.0).round() / 100.0
}

/// Outermost middleware stage: correlation id, start/end events, timing.
pub async fn request_lifecycle(request: Request, next: Next) -> Response {
    let id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let span = tracing::info_span!("request", request_id = %id);
    span.in_scope(|| {
        tracing::info!(
            request_id = %id,
            method = %method,
            path = %path,
            client = %client,
            "REQUEST_START"
        );
    });

    let completion = Completion::start(id, method, span.clone());

    let mut response = next.run(request).instrument(span).await;
    completion.finish(response.status());

    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}
