//! Match batch orchestrator
//!
//! Resolves each request through three branches, terminal on the first hit:
//!
//! 1. Explicit code → catalog lookup (an unknown code leaves the row
//!    unresolved, without error)
//! 2. Fingerprint → bind cache (a hit merges the frozen snapshot and
//!    increments the entry's use count; the catalog is not re-read)
//! 3. Similarity fallback over one catalog scan per batch
//!
//! Batches are fail-fast: the first unrecoverable store error aborts the
//! whole run and no partial result list is emitted. Cancellation is
//! cooperative, checked between requests, and reported distinctly from both
//! success and failure.

use crate::db::{BindStore, QuotaStore};
use crate::models::{BatchOutcome, BatchProgress, MatchRequest, MatchResult, MatchSource, QuotaMatch};
use crate::services::fingerprint::fingerprint;
use crate::services::similarity::SimilarityMatcher;
use chrono::Utc;
use quotamatch_common::events::{EventBus, MatchEvent};
use quotamatch_common::{Error, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Progress is reported at least this often, in requests
const PROGRESS_INTERVAL: usize = 10;

/// Handle to a batch running on its own worker task.
///
/// The caller is never blocked: await `join` for the outcome, or drop the
/// handle and observe the batch through its events (every event carries
/// this `batch_id`).
pub struct BatchHandle {
    pub batch_id: Uuid,
    pub join: JoinHandle<Result<BatchOutcome>>,
    cancel: CancellationToken,
}

impl BatchHandle {
    /// Request cooperative cancellation; the worker stops between requests
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// The token the worker observes, for host-side deadline wiring
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Batch match orchestrator over a quota store and a bind cache.
///
/// Stateless with respect to any presentation layer: explicit inputs in,
/// one outcome out, progress over the event bus.
pub struct MatchOrchestrator<Q, B> {
    quota: Q,
    bind: B,
    event_bus: EventBus,
}

impl<Q: QuotaStore, B: BindStore> MatchOrchestrator<Q, B> {
    pub fn new(quota: Q, bind: B, event_bus: EventBus) -> Self {
        Self {
            quota,
            bind,
            event_bus,
        }
    }

    /// Run a batch to completion on the current task.
    ///
    /// Returns `Ok(BatchOutcome::Completed)` with one result per request in
    /// input order, `Ok(BatchOutcome::Cancelled)` with accumulated results
    /// discarded, or the first unrecoverable error.
    pub async fn run_batch(
        &self,
        project_id: Uuid,
        requests: Vec<MatchRequest>,
        cancel: CancellationToken,
    ) -> Result<BatchOutcome> {
        self.run_batch_as(Uuid::new_v4(), project_id, requests, cancel)
            .await
    }

    /// Spawn a batch on its own worker task and return immediately
    pub fn spawn_batch(
        self: &Arc<Self>,
        project_id: Uuid,
        requests: Vec<MatchRequest>,
        cancel: CancellationToken,
    ) -> BatchHandle
    where
        Q: 'static,
        B: 'static,
    {
        let batch_id = Uuid::new_v4();
        let orchestrator = Arc::clone(self);
        let token = cancel.clone();
        let join = tokio::spawn(async move {
            orchestrator
                .run_batch_as(batch_id, project_id, requests, token)
                .await
        });

        BatchHandle {
            batch_id,
            join,
            cancel,
        }
    }

    async fn run_batch_as(
        &self,
        batch_id: Uuid,
        project_id: Uuid,
        requests: Vec<MatchRequest>,
        cancel: CancellationToken,
    ) -> Result<BatchOutcome> {
        let start = std::time::Instant::now();
        let total = requests.len();

        tracing::info!(%batch_id, %project_id, total, "starting match batch");
        self.event_bus.emit_lossy(MatchEvent::MatchBatchStarted {
            batch_id,
            project_id,
            total_requests: total,
            timestamp: Utc::now(),
        });

        match self
            .process_requests(batch_id, project_id, requests, &cancel)
            .await
        {
            Ok(BatchOutcome::Completed(results)) => {
                let matched = results.iter().filter(|r| r.is_resolved()).count();
                let unresolved = results.len() - matched;
                tracing::info!(%batch_id, matched, unresolved, "match batch completed");
                self.emit_terminal(MatchEvent::MatchBatchCompleted {
                    batch_id,
                    matched,
                    unresolved,
                    duration_seconds: start.elapsed().as_secs(),
                    timestamp: Utc::now(),
                });
                Ok(BatchOutcome::Completed(results))
            }
            Ok(BatchOutcome::Cancelled { processed }) => {
                tracing::warn!(%batch_id, processed, "match batch cancelled");
                self.emit_terminal(MatchEvent::MatchBatchCancelled {
                    batch_id,
                    requests_processed: processed,
                    timestamp: Utc::now(),
                });
                Ok(BatchOutcome::Cancelled { processed })
            }
            Err(e) => {
                tracing::error!(%batch_id, error = %e, "match batch failed");
                self.emit_terminal(MatchEvent::MatchBatchFailed {
                    batch_id,
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                Err(e)
            }
        }
    }

    async fn process_requests(
        &self,
        batch_id: Uuid,
        project_id: Uuid,
        requests: Vec<MatchRequest>,
        cancel: &CancellationToken,
    ) -> Result<BatchOutcome> {
        let total = requests.len();
        let mut results = Vec::with_capacity(total);
        // Built lazily on the first request that reaches the fallback branch
        let mut matcher: Option<SimilarityMatcher> = None;

        for (index, request) in requests.into_iter().enumerate() {
            if cancel.is_cancelled() {
                // Accumulated results are discarded with `results`
                return Ok(BatchOutcome::Cancelled { processed: index });
            }

            let result = self.resolve(project_id, request, &mut matcher).await?;
            results.push(result);

            let done = index + 1;
            if done % PROGRESS_INTERVAL == 0 || done == total {
                let progress = BatchProgress::new(done, total);
                self.event_bus.emit_lossy(MatchEvent::MatchBatchProgress {
                    batch_id,
                    current: done,
                    total,
                    percentage: progress.percentage(),
                    timestamp: Utc::now(),
                });
            }
        }

        Ok(BatchOutcome::Completed(results))
    }

    /// Resolve one request, terminal on the first matching branch
    async fn resolve(
        &self,
        project_id: Uuid,
        request: MatchRequest,
        matcher: &mut Option<SimilarityMatcher>,
    ) -> Result<MatchResult> {
        // Branch 1: explicit code
        if let Some(code) = request.explicit_code() {
            let quota = match self.quota.get_by_code(code).await? {
                Some(record) => {
                    tracing::debug!(code, "resolved via explicit code");
                    Some(QuotaMatch {
                        code: record.code.clone(),
                        fields: record.snapshot(),
                        source: MatchSource::Explicit,
                    })
                }
                None => {
                    tracing::debug!(code, "explicit code not in catalog; left unresolved");
                    None
                }
            };
            return Ok(MatchResult { request, quota });
        }

        // Branch 2: bind cache
        let key = fingerprint(&request.fields);
        if let Some(entry) = self.bind.lookup(project_id, &key).await? {
            self.bind.record_use(entry.id).await?;
            tracing::debug!(
                code = %entry.quota_code,
                use_count = entry.use_count + 1,
                "resolved via bind cache"
            );
            return Ok(MatchResult {
                request,
                quota: Some(QuotaMatch {
                    code: entry.quota_code,
                    // The frozen snapshot, not a fresh catalog read: cache
                    // reuse is cheap and stale-tolerant
                    fields: entry.snapshot,
                    source: MatchSource::Binding,
                }),
            });
        }

        // Branch 3: similarity fallback
        let index = self.catalog_index(matcher).await?;
        let quota = match index.best_match(&request.fields.comparison_text()) {
            Some(record) => {
                tracing::debug!(code = %record.code, "resolved via similarity fallback");
                Some(QuotaMatch {
                    code: record.code.clone(),
                    fields: record.snapshot(),
                    source: MatchSource::Similarity,
                })
            }
            None => {
                tracing::debug!("catalog is empty; left unresolved");
                None
            }
        };
        Ok(MatchResult { request, quota })
    }

    async fn catalog_index<'a>(
        &self,
        matcher: &'a mut Option<SimilarityMatcher>,
    ) -> Result<&'a SimilarityMatcher> {
        if matcher.is_none() {
            let records = self.quota.scan_all().await?;
            tracing::debug!(records = records.len(), "built similarity index");
            *matcher = Some(SimilarityMatcher::build(records));
        }
        match matcher {
            Some(index) => Ok(index),
            None => Err(Error::Internal("similarity index not built".to_string())),
        }
    }

    fn emit_terminal(&self, event: MatchEvent) {
        if self.event_bus.emit(event).is_err() {
            tracing::debug!("no subscribers for terminal batch event");
        }
    }
}
