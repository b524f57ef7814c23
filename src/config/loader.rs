//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{is_production_env, ServerConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Dotenv file read when none is given on the command line.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{name} has invalid value '{value}'")]
    InvalidVar { name: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a dotenv file into the process environment.
///
/// Skipped entirely in production. Returns `false` when a file was expected
/// but could not be read.
pub fn load_env_file(path: Option<&Path>) -> bool {
    if is_production_env() {
        return true;
    }
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_ENV_FILE));
    dotenvy::from_path(path).is_ok()
}

/// Load and validate configuration.
///
/// Starts from the TOML file when given (defaults otherwise), then applies
/// environment variable overrides.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    load_config_with(path, |name| std::env::var(name).ok())
}

/// [`load_config`] with an explicit variable lookup.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ServerConfig::default(),
    };

    apply_env(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn apply_env<F>(config: &mut ServerConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let text = |name: &str, target: &mut String| {
        if let Some(value) = lookup(name) {
            *target = value;
        }
    };
    text("APP_ENV", &mut config.app_env);
    text("DB_HOST", &mut config.database.host);
    text("DB_USER", &mut config.database.user);
    text("DB_PASS", &mut config.database.password);
    text("DB_NAME", &mut config.database.name);
    text("DB_SSLMODE", &mut config.database.ssl_mode);
    text("DB_MIGRATIONS_PATH", &mut config.database.migrations_path);
    text("JWT_SECRET", &mut config.auth.jwt_secret);

    parse_var(&lookup, "PORT", &mut config.listener.port)?;
    parse_var(&lookup, "DB_PORT", &mut config.database.port)?;
    parse_var(&lookup, "DB_MAX_CONNECTIONS", &mut config.database.max_connections)?;
    parse_var(&lookup, "REQUEST_TIMEOUT_SECS", &mut config.timeouts.request_secs)?;
    parse_var(&lookup, "SHUTDOWN_TIMEOUT_SECS", &mut config.timeouts.drain_secs)?;

    Ok(())
}

fn parse_var<F, T>(lookup: &F, name: &'static str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(value) = lookup(name) {
        *target = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidVar { name, value })?;
    }
    Ok(())
}
