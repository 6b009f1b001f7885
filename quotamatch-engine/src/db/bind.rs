//! SQLite bind cache store
//!
//! Expected table shape (creation is host business):
//!
//! ```sql
//! CREATE TABLE quota_bind (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     project_id TEXT NOT NULL,
//!     condition_fingerprint TEXT NOT NULL,
//!     quota_code TEXT NOT NULL,
//!     snapshot TEXT NOT NULL,
//!     use_count INTEGER NOT NULL DEFAULT 1,
//!     created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
//!     updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
//!     UNIQUE (project_id, condition_fingerprint)
//! )
//! ```
//!
//! The UNIQUE key plus `ON CONFLICT ... DO UPDATE` gives the atomic
//! increment-or-insert the cache contract requires; concurrent upserts for
//! one key can never produce two rows.

use crate::db::{BindEntry, BindStore, BindUpsert};
use quotamatch_common::db::quote_ident;
use quotamatch_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Bind cache over a host-supplied SQLite table
#[derive(Clone)]
pub struct SqliteBindStore {
    pool: SqlitePool,
    table: String,
}

impl SqliteBindStore {
    pub fn new(pool: SqlitePool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    fn upsert_sql(&self) -> String {
        format!(
            r#"
            INSERT INTO {} (
                project_id, condition_fingerprint, quota_code, snapshot,
                use_count, created_at, updated_at
            ) VALUES (?, ?, ?, ?, 1, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            ON CONFLICT(project_id, condition_fingerprint) DO UPDATE SET
                use_count = use_count + 1,
                updated_at = CURRENT_TIMESTAMP
            "#,
            quote_ident(&self.table)
        )
    }

    fn decode_entry(row: &SqliteRow) -> Result<BindEntry> {
        let project_id_str: String = row.get("project_id");
        let project_id = Uuid::parse_str(&project_id_str)
            .map_err(|e| Error::Internal(format!("invalid project_id in bind entry: {}", e)))?;

        let snapshot_json: String = row.get("snapshot");
        let snapshot = serde_json::from_str(&snapshot_json).map_err(|e| {
            Error::MalformedCatalogRow(format!("corrupt bind snapshot: {}", e))
        })?;

        Ok(BindEntry {
            id: row.get("id"),
            project_id,
            fingerprint: row.get("condition_fingerprint"),
            quota_code: row.get("quota_code"),
            snapshot,
            use_count: row.get("use_count"),
        })
    }

    fn encode_snapshot(snapshot: &[(String, String)]) -> Result<String> {
        serde_json::to_string(snapshot)
            .map_err(|e| Error::Internal(format!("failed to serialize bind snapshot: {}", e)))
    }
}

impl BindStore for SqliteBindStore {
    async fn lookup(&self, project_id: Uuid, fingerprint: &str) -> Result<Option<BindEntry>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT id, project_id, condition_fingerprint, quota_code, snapshot, use_count
            FROM {}
            WHERE project_id = ? AND condition_fingerprint = ?
            ORDER BY use_count DESC
            LIMIT 1
            "#,
            quote_ident(&self.table)
        ))
        .bind(project_id.to_string())
        .bind(fingerprint)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::decode_entry(&row)?)),
            None => Ok(None),
        }
    }

    async fn record_use(&self, entry_id: i64) -> Result<()> {
        sqlx::query(&format!(
            "UPDATE {} SET use_count = use_count + 1, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            quote_ident(&self.table)
        ))
        .bind(entry_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert(&self, project_id: Uuid, entry: &BindUpsert) -> Result<()> {
        sqlx::query(&self.upsert_sql())
            .bind(project_id.to_string())
            .bind(&entry.fingerprint)
            .bind(&entry.quota_code)
            .bind(Self::encode_snapshot(&entry.snapshot)?)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn upsert_all(&self, project_id: Uuid, entries: &[BindUpsert]) -> Result<usize> {
        let sql = self.upsert_sql();
        let mut tx = self.pool.begin().await?;

        for entry in entries {
            sqlx::query(&sql)
                .bind(project_id.to_string())
                .bind(&entry.fingerprint)
                .bind(&entry.quota_code)
                .bind(Self::encode_snapshot(&entry.snapshot)?)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(entries.len())
    }
}
