//! PostgreSQL connection pool.

use std::str::FromStr;
use std::time::Duration;

use futures_util::future::BoxFuture;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{Connection, PgPool};

use crate::config::DatabaseConfig;
use crate::db::ResourcePool;
use crate::error::{AppError, AppResult};

/// The service's PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect and verify the connection with a ping.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        let ssl_mode = PgSslMode::from_str(&config.ssl_mode).map_err(|e| {
            AppError::wrap_config(e, format!("invalid sslmode '{}'", config.ssl_mode))
        })?;

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name)
            .ssl_mode(ssl_mode);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| AppError::wrap_database(e, "PgPool connect failed"))?;

        let database = Self { pool };
        database.ping().await?;

        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.name,
            max_connections = config.max_connections,
            "Database pool opened"
        );

        Ok(database)
    }

    /// Borrow the underlying pool for queries.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl ResourcePool for Database {
    fn ping(&self) -> BoxFuture<'_, Result<(), AppError>> {
        Box::pin(async move {
            let mut conn = self
                .pool
                .acquire()
                .await
                .map_err(|e| AppError::wrap_database(e, "db acquire failed"))?;
            conn.ping()
                .await
                .map_err(|e| AppError::wrap_database(e, "db ping failed"))
        })
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.pool.close().await;
            tracing::info!("Database pool closed");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn unreachable_config() -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".into(),
            port: 1,
            user: "mediary".into(),
            password: "secret".into(),
            name: "mediary".into(),
            acquire_timeout_secs: 1,
            ..DatabaseConfig::default()
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_database_error() {
        let err = Database::open(&unreachable_config()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Database);
        assert!(err.cause().is_some());
    }

    #[tokio::test]
    async fn bad_ssl_mode_is_config_error() {
        let config = DatabaseConfig {
            ssl_mode: "sometimes".into(),
            ..unreachable_config()
        };
        let err = Database::open(&config).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Config);
    }
}
