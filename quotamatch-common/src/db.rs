//! SQLite pool initialization and identifier quoting
//!
//! Opens the shared pool the quota and bind stores run over. Table creation
//! and migration are host business; the engine only reads and writes tables
//! the host addresses by name.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (or create) the SQLite database and return a connection pool.
///
/// Pool size is raised above the default so concurrent match batches and
/// correction ingestions do not serialize on connection acquisition.
pub async fn init_pool(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode allows concurrent readers with one writer, which keeps
    // match batches readable while an ingestion commits.
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    // Busy timeout so concurrent upserts wait instead of failing immediately
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    Ok(pool)
}

/// Quote a host-supplied table or column name for interpolation into SQL.
///
/// Table refs arrive from the host as plain strings and cannot be bound as
/// values, so they are double-quoted with embedded quotes escaped. Every
/// value position still uses normal parameter binding.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_quote_ident_plain() {
        assert_eq!(quote_ident("quota_2024"), "\"quota_2024\"");
    }

    #[test]
    fn test_quote_ident_escapes_embedded_quotes() {
        assert_eq!(quote_ident("bad\"name"), "\"bad\"\"name\"");
    }

    #[tokio::test]
    async fn test_init_pool_creates_database() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("nested").join("test.db");

        let pool = init_pool(&db_path).await.expect("Failed to init pool");
        assert!(db_path.exists());

        // Pool is usable immediately
        let row: (i64,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("Failed to query");
        assert_eq!(row.0, 1);
    }

    #[tokio::test]
    async fn test_init_pool_reopens_existing_database() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let pool = init_pool(&db_path).await.expect("Failed to init pool");
        sqlx::query("CREATE TABLE marker (id INTEGER PRIMARY KEY)")
            .execute(&pool)
            .await
            .expect("Failed to create table");
        pool.close().await;

        let pool = init_pool(&db_path).await.expect("Failed to reopen pool");
        sqlx::query("SELECT * FROM marker")
            .fetch_all(&pool)
            .await
            .expect("Table should survive reopen");
    }
}
