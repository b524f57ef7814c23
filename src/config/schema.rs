//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Deployment environment (`development`, `production`, ...).
    pub app_env: String,

    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// PostgreSQL connection settings.
    pub database: DatabaseConfig,

    /// Authentication settings.
    pub auth: AuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            app_env: "development".to_string(),
            listener: ListenerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

/// `APP_ENV` value that switches off development conveniences.
pub const PRODUCTION: &str = "production";

/// Whether the process environment declares a production deployment.
///
/// Read before configuration is loaded, by the dotenv and logging setup.
pub fn is_production_env() -> bool {
    std::env::var("APP_ENV").is_ok_and(|env| env == PRODUCTION)
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.app_env == PRODUCTION
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or IP to bind.
    pub host: String,

    /// TCP port. Zero is rejected by validation.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// PostgreSQL connection configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,

    /// libpq-style `sslmode` value.
    pub ssl_mode: String,

    /// Upper bound on pooled connections.
    pub max_connections: u32,

    /// How long to wait for a pooled connection in seconds.
    pub acquire_timeout_secs: u64,

    /// Directory holding `<version>_<name>.sql` migrations.
    pub migrations_path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 5432,
            user: String::new(),
            password: String::new(),
            name: String::new(),
            ssl_mode: "disable".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 5,
            migrations_path: "db/migrations".to_string(),
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("migrations_path", &self.migrations_path)
            .finish()
    }
}

/// Authentication settings. Only loaded and validated here.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}

/// Timeout configuration for request handling and shutdown.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-request timeout in seconds.
    pub request_secs: u64,

    /// Bound on the graceful drain after a shutdown signal, in seconds.
    pub drain_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 15,
            drain_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_conventions() {
        let config = ServerConfig::default();
        assert_eq!(config.app_env, "development");
        assert_eq!(config.listener.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.ssl_mode, "disable");
        assert_eq!(config.timeouts.request_secs, 15);
        assert_eq!(config.timeouts.drain_secs, 10);
    }

    #[test]
    fn production_is_named_explicitly() {
        let mut config = ServerConfig::default();
        assert!(!config.is_production());
        config.app_env = PRODUCTION.to_string();
        assert!(config.is_production());
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = ServerConfig::default();
        config.database.password = "hunter2".into();
        config.auth.jwt_secret = "s3cret".into();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [listener]
            port = 9000

            [database]
            host = "db.internal"
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 5432);
    }
}
