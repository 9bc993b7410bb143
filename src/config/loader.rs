//! Configuration loading from disk and the process environment.

use std::path::Path;
use std::fs;
use thiserror::Error;

use crate::config::schema::{ServiceConfig, StoreDriver};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {message}")]
    Env { var: &'static str, message: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts `std::env::var` so tests don't touch the process environment.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("MYSQL_USER") {
        config.database.user = v;
    }
    if let Some(v) = lookup("MYSQL_PASSWORD") {
        config.database.password = v;
    }
    if let Some(v) = lookup("MYSQL_HOST") {
        config.database.host = v;
    }
    if let Some(v) = lookup("MYSQL_DB") {
        config.database.name = v;
    }
    if let Some(v) = lookup("CALC_DB_DRIVER") {
        config.database.driver = v
            .parse::<StoreDriver>()
            .map_err(|message| ConfigError::Env { var: "CALC_DB_DRIVER", message })?;
    }
    if let Some(v) = lookup("CALC_BIND_ADDRESS") {
        config.listener.bind_address = v;
    }
    if let Some(v) = lookup("CALC_LOG_FILE") {
        config.observability.log_file = if v.is_empty() { None } else { Some(v) };
    }
    if let Some(v) = lookup("CALC_LOG_LEVEL") {
        config.observability.log_level = v;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_database_fields() {
        let mut config = ServiceConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("MYSQL_USER", "calc"),
                ("MYSQL_PASSWORD", "pw"),
                ("MYSQL_HOST", "db.internal"),
                ("MYSQL_DB", "ledger"),
            ]),
        )
        .unwrap();

        assert_eq!(config.database.user, "calc");
        assert_eq!(config.database.password, "pw");
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.name, "ledger");
    }

    #[test]
    fn test_missing_env_keeps_placeholders() {
        let mut config = ServiceConfig::default();
        apply_env_overrides(&mut config, env(&[])).unwrap();

        assert_eq!(config.database.user, "root");
        assert_eq!(config.database.password, "my-secret-pw");
        assert_eq!(config.database.host, "mysql");
        assert_eq!(config.database.name, "calculator");
    }

    #[test]
    fn test_unknown_driver_is_rejected() {
        let mut config = ServiceConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("CALC_DB_DRIVER", "oracle")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "CALC_DB_DRIVER", .. }));
    }

    #[test]
    fn test_load_from_file_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[bootstrap]\nmax_attempts = 0").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert!(errors.iter().any(|e| e.field == "bootstrap.max_attempts"));
            }
            other => panic!("expected validation error, got {other}"),
        }
    }
}
