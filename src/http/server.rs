//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up the middleware stages in a fixed order
//! - Bind server to listener and serve until shutdown

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::calculator::OperationHandler;
use crate::config::ServiceConfig;
use crate::http::calculate;
use crate::http::request::request_lifecycle;
use crate::store::Store;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub operations: OperationHandler,
}

/// HTTP server for the calculator.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around an already bootstrapped store.
    pub fn new(config: ServiceConfig, store: Store) -> Self {
        let state = AppState {
            operations: OperationHandler::new(store),
        };
        Self {
            router: build_router(&config, state),
        }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the router with its middleware stages.
///
/// Stages, outermost first:
/// 1. request lifecycle (request id, REQUEST_START / REQUEST_END)
/// 2. tower-http trace
/// 3. panic → 500
/// 4. request timeout
/// 5. body size limit
///
/// The body limit wraps the routes on its own because its response body
/// type does not satisfy the timeout stage.
#[allow(deprecated)]
pub fn build_router(config: &ServiceConfig, state: AppState) -> Router {
    let stages = ServiceBuilder::new()
        .layer(middleware::from_fn(request_lifecycle))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

    Router::new()
        .route("/add", post(calculate::add))
        .route("/health", get(calculate::health))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
        .layer(stages)
}
