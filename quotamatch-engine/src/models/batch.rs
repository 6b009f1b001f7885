//! Batch outcome and progress models

use crate::models::MatchResult;
use serde::{Deserialize, Serialize};

/// Terminal state of a match batch.
///
/// Cancellation is distinct from both success and failure: a cancelled batch
/// returns `Ok(Cancelled { .. })` with its accumulated results discarded,
/// while a failed batch returns `Err` and never emits a partial list.
#[derive(Debug)]
pub enum BatchOutcome {
    /// Every request was processed; one result per request, in input order
    Completed(Vec<MatchResult>),
    /// Cancellation was observed between requests
    Cancelled {
        /// Requests processed before the cancellation was observed
        processed: usize,
    },
}

/// Progress of a running batch, as reported over the event bus
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BatchProgress {
    pub current: usize,
    pub total: usize,
}

impl BatchProgress {
    pub fn new(current: usize, total: usize) -> Self {
        Self { current, total }
    }

    /// Percentage of requests completed (0.0-100.0)
    pub fn percentage(&self) -> f32 {
        if self.total > 0 {
            (self.current as f32 / self.total as f32) * 100.0
        } else {
            100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(BatchProgress::new(10, 25).percentage(), 40.0);
        assert_eq!(BatchProgress::new(25, 25).percentage(), 100.0);
        assert_eq!(BatchProgress::new(0, 25).percentage(), 0.0);
    }

    #[test]
    fn test_empty_batch_is_complete() {
        assert_eq!(BatchProgress::new(0, 0).percentage(), 100.0);
    }
}
