//! Calculator service library.
//!
//! An HTTP service that adds two numbers and records every calculation,
//! with a bootstrap that waits for its datastore and a transactional
//! session per request.

pub mod calculator;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod store;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::Store;
