/// Database layer for the WaiEdu store
///
/// Manages the SQLite connection pool, structural provisioning, and the
/// seeded reference data.

pub mod models;
pub mod schema;
pub mod seed;

use crate::error::{DataError, DataResult};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// Database connection options
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub max_connections: u32,
    pub enable_wal: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            enable_wal: true,
        }
    }
}

/// Create a SQLite connection pool
pub async fn create_pool(path: &Path, options: DatabaseOptions) -> DataResult<SqlitePool> {
    // Ensure parent directory exists (":memory:" has no real parent)
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(options.max_connections)
        .connect_with(
            sqlx::sqlite::SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(if options.enable_wal {
                    sqlx::sqlite::SqliteJournalMode::Wal
                } else {
                    sqlx::sqlite::SqliteJournalMode::Delete
                })
                .foreign_keys(true)
                .busy_timeout(std::time::Duration::from_secs(5)),
        )
        .await
        .map_err(DataError::Database)?;

    Ok(pool)
}

/// Test database connection
pub async fn test_connection(pool: &SqlitePool) -> DataResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(DataError::Database)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool_in_memory() {
        let pool = create_pool(
            Path::new(":memory:"),
            DatabaseOptions {
                max_connections: 1,
                enable_wal: false,
            },
        )
        .await
        .unwrap();

        test_connection(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_pool_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.sqlite");

        let pool = create_pool(&path, DatabaseOptions::default()).await.unwrap();
        test_connection(&pool).await.unwrap();
        assert!(path.exists());
    }
}
