//! Correction ingestor
//!
//! Writes user-confirmed (request, code) pairs into the bind cache so later
//! batches resolve the same five-tuple without falling back to similarity.
//! Only explicit fixes reach the cache; automatic fallback resolutions never
//! write back.

use crate::db::{BindStore, BindUpsert, QuotaStore};
use crate::models::MatchFields;
use crate::services::fingerprint::fingerprint;
use chrono::Utc;
use quotamatch_common::events::{EventBus, MatchEvent};
use quotamatch_common::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One user-confirmed fix: a request's five-tuple and the chosen code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correction {
    pub fields: MatchFields,
    pub code: String,
}

/// Outcome of one ingestion call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    /// Corrections written (inserted or use-count bumped)
    pub saved: usize,
    /// Corrections skipped (empty or unknown code)
    pub skipped: usize,
}

/// Ingests confirmed corrections into the bind cache
pub struct CorrectionIngestor<Q, B> {
    quota: Q,
    bind: B,
    event_bus: EventBus,
}

impl<Q: QuotaStore, B: BindStore> CorrectionIngestor<Q, B> {
    pub fn new(quota: Q, bind: B, event_bus: EventBus) -> Self {
        Self {
            quota,
            bind,
            event_bus,
        }
    }

    /// Ingest a set of corrections for one project, all-or-nothing.
    ///
    /// Pairs with an empty code are skipped silently; pairs whose code is
    /// not in the catalog are skipped with a warning (no snapshot can be
    /// frozen for them). The rest commit in one bind-store transaction.
    ///
    /// The snapshot read here only matters when the upsert inserts a new
    /// entry; an existing entry is refreshed by use count alone and its
    /// frozen snapshot is never overwritten.
    pub async fn ingest(
        &self,
        project_id: Uuid,
        corrections: Vec<Correction>,
    ) -> Result<IngestSummary> {
        let total = corrections.len();
        tracing::info!(%project_id, total, "ingesting corrections");

        let mut entries = Vec::new();
        let mut skipped = 0usize;
        for correction in &corrections {
            if correction.code.is_empty() {
                skipped += 1;
                continue;
            }

            let Some(record) = self.quota.get_by_code(&correction.code).await? else {
                tracing::warn!(code = %correction.code, "correction code not in catalog; skipped");
                skipped += 1;
                continue;
            };

            entries.push(BindUpsert {
                fingerprint: fingerprint(&correction.fields),
                quota_code: record.code.clone(),
                snapshot: record.snapshot(),
            });
        }

        let saved = self.bind.upsert_all(project_id, &entries).await?;
        tracing::info!(%project_id, saved, skipped, "corrections ingested");

        if self
            .event_bus
            .emit(MatchEvent::CorrectionsIngested {
                project_id,
                saved,
                skipped,
                timestamp: Utc::now(),
            })
            .is_err()
        {
            tracing::debug!("no subscribers for correction ingestion event");
        }

        Ok(IngestSummary { saved, skipped })
    }
}
