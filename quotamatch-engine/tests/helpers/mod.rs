//! Shared helpers for integration tests
#![allow(dead_code)]

use anyhow::Result;
use quotamatch_engine::models::{MatchFields, MatchRequest};
use sqlx::SqlitePool;

/// Make engine logs visible under RUST_LOG; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// In-memory pool for single-task tests
pub async fn memory_pool() -> Result<SqlitePool> {
    init_tracing();
    Ok(SqlitePool::connect("sqlite::memory:").await?)
}

/// Create a host-shaped quota catalog table
pub async fn create_quota_table(pool: &SqlitePool, table: &str) -> Result<()> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE "{}" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL DEFAULT '',
            spec TEXT NOT NULL DEFAULT '',
            model TEXT NOT NULL DEFAULT '',
            work_content TEXT NOT NULL DEFAULT '',
            feature TEXT NOT NULL DEFAULT '',
            unit TEXT,
            price REAL
        )
        "#,
        table
    ))
    .execute(pool)
    .await?;
    Ok(())
}

/// Create a host-shaped bind cache table with the UNIQUE key the atomic
/// upsert relies on
pub async fn create_bind_table(pool: &SqlitePool, table: &str) -> Result<()> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE "{}" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id TEXT NOT NULL,
            condition_fingerprint TEXT NOT NULL,
            quota_code TEXT NOT NULL,
            snapshot TEXT NOT NULL,
            use_count INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (project_id, condition_fingerprint)
        )
        "#,
        table
    ))
    .execute(pool)
    .await?;
    Ok(())
}

/// Insert one catalog record with unit/price extras
pub async fn insert_quota(
    pool: &SqlitePool,
    table: &str,
    code: &str,
    name: &str,
    spec: &str,
    unit: &str,
    price: f64,
) -> Result<()> {
    sqlx::query(&format!(
        "INSERT INTO \"{}\" (code, name, spec, unit, price) VALUES (?, ?, ?, ?, ?)",
        table
    ))
    .bind(code)
    .bind(name)
    .bind(spec)
    .bind(unit)
    .bind(price)
    .execute(pool)
    .await?;
    Ok(())
}

pub fn fields(name: &str, spec: &str) -> MatchFields {
    MatchFields {
        name: name.to_string(),
        spec: spec.to_string(),
        ..Default::default()
    }
}

/// Request resolving through fingerprint/similarity (no explicit code)
pub fn plain_request(name: &str, spec: &str) -> MatchRequest {
    MatchRequest {
        fields: fields(name, spec),
        correction_code: None,
        extras: vec![],
    }
}

/// Request carrying an explicit correction code
pub fn coded_request(code: &str) -> MatchRequest {
    MatchRequest {
        fields: MatchFields::default(),
        correction_code: Some(code.to_string()),
        extras: vec![],
    }
}

/// Current use_count of the single bind entry for a fingerprint
pub async fn use_count(
    pool: &SqlitePool,
    table: &str,
    project_id: uuid::Uuid,
    fingerprint: &str,
) -> Result<i64> {
    let row: (i64,) = sqlx::query_as(&format!(
        "SELECT use_count FROM \"{}\" WHERE project_id = ? AND condition_fingerprint = ?",
        table
    ))
    .bind(project_id.to_string())
    .bind(fingerprint)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Number of bind entries in the table
pub async fn bind_row_count(pool: &SqlitePool, table: &str) -> Result<i64> {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM \"{}\"", table))
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
