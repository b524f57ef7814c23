//! Schema migrations.

use std::path::Path;

use sqlx::migrate::Migrator;

use crate::db::Database;
use crate::error::{AppError, AppResult};

/// Read the migration set from `path`.
pub async fn load_migrator(path: &Path) -> AppResult<Migrator> {
    Migrator::new(path.to_path_buf()).await.map_err(|e| {
        AppError::wrap_database(e, format!("failed to read migrations from {}", path.display()))
    })
}

/// Apply pending migrations. An empty migration set is not an error.
pub async fn run_migrations(database: &Database, path: &Path) -> AppResult<()> {
    let migrator = load_migrator(path).await?;

    let available = migrator.iter().count();
    if available == 0 {
        tracing::info!(path = %path.display(), "No migrations to apply");
        return Ok(());
    }

    migrator
        .run(database.pool())
        .await
        .map_err(|e| AppError::wrap_database(e, "postgres migration failed"))?;

    tracing::info!(path = %path.display(), available, "Migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn reads_sql_files_and_ignores_others() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1_init.sql"), "CREATE TABLE t (id INT);").unwrap();
        std::fs::write(dir.path().join(".gitkeep"), "").unwrap();

        let migrator = load_migrator(dir.path()).await.unwrap();
        assert_eq!(migrator.iter().count(), 1);
    }

    #[tokio::test]
    async fn missing_directory_is_database_error() {
        let err = load_migrator(Path::new("/nonexistent/migrations"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Database);
    }
}
