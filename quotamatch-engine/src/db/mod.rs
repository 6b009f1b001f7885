//! Store contracts and their SQLite implementations
//!
//! The engine consumes the quota catalog and the bind cache only through
//! these two traits. Hosts normally use the provided SQLite implementations
//! over a shared `sqlx::SqlitePool`, but tests (and hosts with other
//! backends) can implement the traits directly.
//!
//! Trait methods return `impl Future + Send` explicitly so batches built
//! over generic stores can run on spawned tasks.

pub mod bind;
pub mod quota;

pub use bind::SqliteBindStore;
pub use quota::SqliteQuotaStore;

use crate::models::QuotaRecord;
use quotamatch_common::Result;
use std::future::Future;
use uuid::Uuid;

/// One bind-cache row: a confirmed (fingerprint → quota code) resolution
/// with its frozen field snapshot and usage counter.
#[derive(Debug, Clone)]
pub struct BindEntry {
    /// Store-assigned row id, used by `record_use`
    pub id: i64,
    pub project_id: Uuid,
    pub fingerprint: String,
    pub quota_code: String,
    /// Quota fields frozen at binding time, (name, value), in snapshot order
    pub snapshot: Vec<(String, String)>,
    pub use_count: i64,
}

/// One entry of a grouped bind-cache upsert
#[derive(Debug, Clone)]
pub struct BindUpsert {
    pub fingerprint: String,
    pub quota_code: String,
    pub snapshot: Vec<(String, String)>,
}

/// Read-only access to the quota catalog.
///
/// The catalog is immutable from the engine's perspective; an absent code is
/// a resolution outcome (`None`), never an error.
pub trait QuotaStore: Send + Sync {
    /// Ordered catalog column names, excluding the internal identity column
    fn columns(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Look up one record by its unique business code
    fn get_by_code(&self, code: &str) -> impl Future<Output = Result<Option<QuotaRecord>>> + Send;

    /// Every catalog record. Order is store-defined and must be treated as
    /// arbitrary; callers scan at most once per batch.
    fn scan_all(&self) -> impl Future<Output = Result<Vec<QuotaRecord>>> + Send;
}

/// Per-project memo of confirmed resolutions.
///
/// Writes to one `(project_id, fingerprint)` key must be serialized by the
/// store: `upsert` is atomic with respect to its existence check, and the
/// grouped `upsert_all` commits all-or-nothing.
pub trait BindStore: Send + Sync {
    /// The single highest-`use_count` entry for the key, if any exist.
    /// The key is expected unique; ordering is a defensive tie-break.
    fn lookup(
        &self,
        project_id: Uuid,
        fingerprint: &str,
    ) -> impl Future<Output = Result<Option<BindEntry>>> + Send;

    /// Atomically increment an entry's `use_count` by 1. A vanished row is
    /// not an error.
    fn record_use(&self, entry_id: i64) -> impl Future<Output = Result<()>> + Send;

    /// Insert with `use_count = 1`, or increment an existing entry's
    /// `use_count` leaving its code and snapshot untouched. Atomic: two
    /// concurrent upserts for the same key never produce two entries.
    fn upsert(
        &self,
        project_id: Uuid,
        entry: &BindUpsert,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Grouped form used by correction ingestion: every upsert in one store
    /// transaction, commit together or not at all. Returns the number of
    /// entries written.
    fn upsert_all(
        &self,
        project_id: Uuid,
        entries: &[BindUpsert],
    ) -> impl Future<Output = Result<usize>> + Send;
}
