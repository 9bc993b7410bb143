//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, file or stdout)
//!     → metrics.rs (counters, histograms)
//!
//! http::request attaches a span carrying the request id, so session and
//! handler events inside a request are correlated without passing ids around.
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LoggingError};
