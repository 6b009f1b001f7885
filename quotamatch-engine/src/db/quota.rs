//! SQLite quota catalog store
//!
//! Resolves the code and the five matchable attributes **by column name**
//! (`code`, `name`, `spec`, `model`, `work_content`, `feature`); a catalog
//! missing any of them fails with a malformed-row error naming the column.
//! Every other non-`id` column passes through opaquely in store column order.

use crate::db::QuotaStore;
use crate::models::QuotaRecord;
use quotamatch_common::db::quote_ident;
use quotamatch_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqlitePool};

/// Canonical matchable columns, in fingerprint order, preceded by the code
const CANONICAL_COLUMNS: [&str; 6] = ["code", "name", "spec", "model", "work_content", "feature"];

/// Quota catalog over a host-supplied SQLite table
#[derive(Clone)]
pub struct SqliteQuotaStore {
    pool: SqlitePool,
    table: String,
}

impl SqliteQuotaStore {
    pub fn new(pool: SqlitePool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    fn decode_record(row: &SqliteRow) -> Result<QuotaRecord> {
        let mut extras = Vec::new();
        for (idx, column) in row.columns().iter().enumerate() {
            let name = column.name();
            if name == "id" || CANONICAL_COLUMNS.contains(&name) {
                continue;
            }
            extras.push((name.to_string(), extra_text(row, idx)));
        }

        Ok(QuotaRecord {
            code: canonical_text(row, "code")?,
            name: canonical_text(row, "name")?,
            spec: canonical_text(row, "spec")?,
            model: canonical_text(row, "model")?,
            work_content: canonical_text(row, "work_content")?,
            feature: canonical_text(row, "feature")?,
            extras,
        })
    }
}

/// Decode a canonical matchable column. Absence or a non-text value is a
/// schema mismatch, not a transport failure.
fn canonical_text(row: &SqliteRow, name: &str) -> Result<String> {
    match row.try_get::<Option<String>, _>(name) {
        Ok(value) => Ok(value.unwrap_or_default()),
        Err(sqlx::Error::ColumnNotFound(_)) => Err(Error::MalformedCatalogRow(format!(
            "catalog is missing required column '{}'",
            name
        ))),
        Err(sqlx::Error::ColumnDecode { .. }) => Err(Error::MalformedCatalogRow(format!(
            "catalog column '{}' is not text",
            name
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Stringify an opaque passthrough column. NULL becomes the empty string;
/// numeric columns are formatted; undecodable values degrade to empty.
fn extra_text(row: &SqliteRow, idx: usize) -> String {
    if let Ok(value) = row.try_get::<Option<String>, _>(idx) {
        return value.unwrap_or_default();
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(idx) {
        return value.map(|n| n.to_string()).unwrap_or_default();
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(idx) {
        return value.map(|n| n.to_string()).unwrap_or_default();
    }
    String::new()
}

impl QuotaStore for SqliteQuotaStore {
    async fn columns(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(&format!("PRAGMA table_info({})", quote_ident(&self.table)))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| row.get::<String, _>("name"))
            .filter(|name| name != "id")
            .collect())
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<QuotaRecord>> {
        let row = sqlx::query(&format!(
            "SELECT * FROM {} WHERE code = ? LIMIT 1",
            quote_ident(&self.table)
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::decode_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn scan_all(&self) -> Result<Vec<QuotaRecord>> {
        let rows = sqlx::query(&format!("SELECT * FROM {}", quote_ident(&self.table)))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::decode_record).collect()
    }
}
