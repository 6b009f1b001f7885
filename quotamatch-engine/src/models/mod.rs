//! Data models for the QuotaMatch engine
//!
//! - Quota catalog records and their field snapshots
//! - Match requests, results, and resolution sources
//! - Batch outcomes and progress
//! - Project context supplied by the host

pub mod batch;
pub mod project;
pub mod quota;
pub mod request;

pub use batch::{BatchOutcome, BatchProgress};
pub use project::ProjectContext;
pub use quota::QuotaRecord;
pub use request::{MatchFields, MatchRequest, MatchResult, MatchSource, QuotaMatch};
