//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check required settings are present
//! - Validate value ranges (timeouts > 0, ports valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// `sslmode` values understood by the PostgreSQL driver.
pub const SSL_MODES: &[&str] = &[
    "disable",
    "allow",
    "prefer",
    "require",
    "verify-ca",
    "verify-full",
];

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{0} must be a valid number between 1-65535")]
    InvalidPort(&'static str),

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("DB_SSLMODE '{0}' is not a recognised sslmode")]
    InvalidSslMode(String),
}

/// Check every semantic rule and report all violations.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::InvalidPort("PORT"));
    }
    if config.database.port == 0 {
        errors.push(ValidationError::InvalidPort("DB_PORT"));
    }

    let required = [
        ("DB_HOST", &config.database.host),
        ("DB_USER", &config.database.user),
        ("DB_PASS", &config.database.password),
        ("DB_NAME", &config.database.name),
        ("JWT_SECRET", &config.auth.jwt_secret),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            errors.push(ValidationError::Missing(name));
        }
    }

    if !SSL_MODES.contains(&config.database.ssl_mode.as_str()) {
        errors.push(ValidationError::InvalidSslMode(config.database.ssl_mode.clone()));
    }

    if config.database.max_connections == 0 {
        errors.push(ValidationError::NotPositive("DB_MAX_CONNECTIONS"));
    }
    if config.database.acquire_timeout_secs == 0 {
        errors.push(ValidationError::NotPositive("database.acquire_timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::NotPositive("REQUEST_TIMEOUT_SECS"));
    }
    if config.timeouts.drain_secs == 0 {
        errors.push(ValidationError::NotPositive("SHUTDOWN_TIMEOUT_SECS"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
