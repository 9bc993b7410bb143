//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     → store::bootstrap probes the datastore
//!     → On failure: backoff.rs decides how long to wait before the next probe
//!     → After max_attempts: startup aborts
//! ```
//!
//! # Design Decisions
//! - Default policy is a fixed interval; exponential with jitter is opt-in
//! - Only connectivity probes are retried, never schema provisioning
//! - Request handling never retries (inserts are not idempotent)

pub mod backoff;

pub use backoff::RetryPolicy;
