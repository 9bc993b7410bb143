//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts > 0, timeouts > 0, addresses parse)
//! - Reject database names that are unsafe to interpolate into DDL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{ServiceConfig, StoreDriver};

/// A single semantic problem with the loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let db = &config.database;

    if db.user.trim().is_empty() {
        errors.push(ValidationError::new("database.user", "must not be empty"));
    }
    // SQLite files have no credentials.
    if db.driver == StoreDriver::MySql && db.password.is_empty() {
        errors.push(ValidationError::new("database.password", "must not be empty"));
    }
    if db.host.trim().is_empty() {
        errors.push(ValidationError::new("database.host", "must not be empty"));
    }
    if db.name.is_empty() {
        errors.push(ValidationError::new("database.name", "must not be empty"));
    } else if !is_valid_identifier(&db.name) {
        errors.push(ValidationError::new(
            "database.name",
            format!("'{}' may only contain ASCII letters, digits and '_'", db.name),
        ));
    }
    if db.max_connections == 0 {
        errors.push(ValidationError::new("database.max_connections", "must be greater than 0"));
    }
    if db.acquire_timeout_secs == 0 {
        errors.push(ValidationError::new("database.acquire_timeout_secs", "must be greater than 0"));
    }

    if config.bootstrap.max_attempts == 0 {
        errors.push(ValidationError::new("bootstrap.max_attempts", "must be greater than 0"));
    }
    if config.bootstrap.probe_timeout_secs == 0 {
        errors.push(ValidationError::new("bootstrap.probe_timeout_secs", "must be greater than 0"));
    }
    if config.bootstrap.max_interval_ms < config.bootstrap.interval_ms {
        errors.push(ValidationError::new(
            "bootstrap.max_interval_ms",
            "must not be smaller than bootstrap.interval_ms",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::new("limits.max_body_bytes", "must be greater than 0"));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_valid_identifier(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
