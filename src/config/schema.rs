//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// Root configuration for the calculator service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Datastore connection settings.
    pub database: DatabaseConfig,

    /// Startup retry policy while waiting for the datastore.
    pub bootstrap: BootstrapConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Which SQL backend the store talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreDriver {
    MySql,
    Sqlite,
}

impl std::str::FromStr for StoreDriver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(StoreDriver::MySql),
            "sqlite" => Ok(StoreDriver::Sqlite),
            other => Err(format!("unknown database driver '{}'", other)),
        }
    }
}

/// Datastore connection configuration.
///
/// For `sqlite` the `host` field names the directory holding `<name>.db`.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub driver: StoreDriver,
    pub user: String,
    pub password: String,
    pub host: String,
    /// Target database, created on bootstrap if absent.
    pub name: String,

    /// Upper bound on pooled connections.
    pub max_connections: u32,

    /// How long a request may wait for a pooled connection.
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: StoreDriver::MySql,
            user: "root".to_string(),
            password: "my-secret-pw".to_string(),
            host: "mysql".to_string(),
            name: "calculator".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

// Keeps the password out of startup logs.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("driver", &self.driver)
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

impl DatabaseConfig {
    /// URL of the server without a database selected.
    ///
    /// Used for probing and for `CREATE DATABASE`. The SQLite form is
    /// read-only so that probing never creates the file.
    pub fn server_url(&self) -> String {
        match self.driver {
            StoreDriver::MySql => format!("mysql://{}@{}", self.userinfo(), self.host),
            StoreDriver::Sqlite => format!("sqlite://{}?mode=ro", self.sqlite_file().display()),
        }
    }

    /// URL of the target database, used by the connection pool.
    pub fn database_url(&self) -> String {
        match self.driver {
            StoreDriver::MySql => format!("mysql://{}@{}/{}", self.userinfo(), self.host, self.name),
            StoreDriver::Sqlite => format!("sqlite://{}?mode=rwc", self.sqlite_file().display()),
        }
    }

    /// Location of the SQLite database file (`<host>/<name>.db`).
    pub fn sqlite_file(&self) -> PathBuf {
        PathBuf::from(self.host.trim_end_matches('/')).join(format!("{}.db", self.name))
    }

    // sqlx percent-decodes both parts, so reserved characters survive.
    fn userinfo(&self) -> String {
        format!(
            "{}:{}",
            utf8_percent_encode(&self.user, NON_ALPHANUMERIC),
            utf8_percent_encode(&self.password, NON_ALPHANUMERIC)
        )
    }
}

/// Backoff strategy between bootstrap probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    Fixed,
    Exponential,
}

/// Bootstrap retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Maximum number of connectivity probes before giving up.
    pub max_attempts: u32,

    /// Delay between probes in milliseconds (base delay for exponential).
    pub interval_ms: u64,

    pub backoff: BackoffKind,

    /// Cap for exponential backoff in milliseconds.
    pub max_interval_ms: u64,

    /// Per-probe connect timeout in seconds.
    pub probe_timeout_secs: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval_ms: 2000,
            backoff: BackoffKind::Fixed,
            max_interval_ms: 30_000,
            probe_timeout_secs: 5,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_body_bytes: 64 * 1024 }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Append log lines to this file instead of stdout.
    pub log_file: Option<String>,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "debug".to_string(),
            log_file: None,
            log_format: LogFormat::Text,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
