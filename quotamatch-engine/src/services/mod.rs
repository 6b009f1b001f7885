//! Service components of the matching engine
//!
//! - Condition fingerprinting (cache key derivation)
//! - Similarity fallback matching over the catalog
//! - Batch match orchestration with progress and cancellation
//! - Correction ingestion into the bind cache

pub mod correction_ingestor;
pub mod fingerprint;
pub mod match_orchestrator;
pub mod similarity;

pub use correction_ingestor::{Correction, CorrectionIngestor, IngestSummary};
pub use fingerprint::fingerprint;
pub use match_orchestrator::{BatchHandle, MatchOrchestrator};
pub use similarity::SimilarityMatcher;
