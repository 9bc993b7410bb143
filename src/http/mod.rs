//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stages)
//!     → request.rs (request ID, start/end events, timing)
//!     → calculate.rs (extract operands, call the operation handler)
//!     → response.rs (result or error payload)
//!     → Send to client
//! ```

pub mod calculate;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_lifecycle, X_REQUEST_ID};
pub use server::{build_router, AppState, HttpServer};
