//! Event types for the QuotaMatch event system
//!
//! Provides the shared event definitions and EventBus used by the engine
//! and any presentation layer observing it.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// QuotaMatch event types
///
/// Events are broadcast via [`EventBus`] and can be serialized for
/// transmission to a host UI. All engine notifications use this central
/// enum for type safety and exhaustive matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MatchEvent {
    /// Match batch started
    ///
    /// Triggers:
    /// - Host UI: show batch progress indicator
    MatchBatchStarted {
        /// Batch UUID
        batch_id: Uuid,
        /// Project whose bind cache scopes the batch
        project_id: Uuid,
        /// Number of requests in the batch
        total_requests: usize,
        /// When the batch started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Match batch progress update
    ///
    /// Emitted after every 10th processed request and after the final one.
    ///
    /// Triggers:
    /// - Host UI: update progress bar
    MatchBatchProgress {
        /// Batch UUID
        batch_id: Uuid,
        /// Requests processed so far
        current: usize,
        /// Total requests in the batch
        total: usize,
        /// Progress percentage (0.0-100.0)
        percentage: f32,
        /// When progress was measured
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Match batch completed successfully
    ///
    /// Triggers:
    /// - Host UI: show completion notification and result table
    MatchBatchCompleted {
        /// Batch UUID
        batch_id: Uuid,
        /// Requests resolved to a quota code
        matched: usize,
        /// Requests left unresolved
        unresolved: usize,
        /// Batch duration in seconds
        duration_seconds: u64,
        /// When the batch completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Match batch aborted by an unrecoverable error
    ///
    /// Partial results are discarded; the message describes the first
    /// failure encountered.
    ///
    /// Triggers:
    /// - Host UI: show error notification
    MatchBatchFailed {
        /// Batch UUID
        batch_id: Uuid,
        /// Error message details
        error_message: String,
        /// When the batch failed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Match batch cancelled by the host
    ///
    /// Triggers:
    /// - Host UI: show cancellation notification
    MatchBatchCancelled {
        /// Batch UUID
        batch_id: Uuid,
        /// Requests processed before cancellation was observed
        requests_processed: usize,
        /// When the batch was cancelled
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Correction ingestion committed
    ///
    /// Triggers:
    /// - Host UI: show confirmation counts
    CorrectionsIngested {
        /// Project whose bind cache was updated
        project_id: Uuid,
        /// Corrections written (inserted or use-count bumped)
        saved: usize,
        /// Corrections skipped (empty or unknown code)
        skipped: usize,
        /// When the ingestion committed
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl MatchEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            MatchEvent::MatchBatchStarted { .. } => "MatchBatchStarted",
            MatchEvent::MatchBatchProgress { .. } => "MatchBatchProgress",
            MatchEvent::MatchBatchCompleted { .. } => "MatchBatchCompleted",
            MatchEvent::MatchBatchFailed { .. } => "MatchBatchFailed",
            MatchEvent::MatchBatchCancelled { .. } => "MatchBatchCancelled",
            MatchEvent::CorrectionsIngested { .. } => "CorrectionsIngested",
        }
    }

    /// Batch id carried by the event, if it concerns a batch
    pub fn batch_id(&self) -> Option<Uuid> {
        match self {
            MatchEvent::MatchBatchStarted { batch_id, .. }
            | MatchEvent::MatchBatchProgress { batch_id, .. }
            | MatchEvent::MatchBatchCompleted { batch_id, .. }
            | MatchEvent::MatchBatchFailed { batch_id, .. }
            | MatchEvent::MatchBatchCancelled { batch_id, .. } => Some(*batch_id),
            MatchEvent::CorrectionsIngested { .. } => None,
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus for engine events
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
///
/// # Capacity Recommendations
///
/// - Desktop hosts: 1000
/// - Testing: 10-100
///
/// # Examples
///
/// ```
/// use quotamatch_common::events::{EventBus, MatchEvent};
/// use std::sync::Arc;
/// use uuid::Uuid;
///
/// let event_bus = Arc::new(EventBus::new(1000));
///
/// // Subscribe to events
/// let mut rx = event_bus.subscribe();
///
/// // Emit an event
/// event_bus.emit(MatchEvent::MatchBatchStarted {
///     batch_id: Uuid::new_v4(),
///     project_id: Uuid::new_v4(),
///     total_requests: 25,
///     timestamp: chrono::Utc::now(),
/// }).ok();
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MatchEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Returns a receiver that will receive all events emitted after
    /// subscription. Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening. Used for terminal
    /// batch events a host normally must observe.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: MatchEvent,
    ) -> Result<usize, broadcast::error::SendError<MatchEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Used for progress updates, where it's acceptable if no component
    /// is currently listening.
    pub fn emit_lossy(&self, event: MatchEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    ///
    /// Useful for debugging and monitoring
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_progress(current: usize) -> MatchEvent {
        MatchEvent::MatchBatchProgress {
            batch_id: Uuid::new_v4(),
            current,
            total: 100,
            percentage: current as f32,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_eventbus_new() {
        let bus = EventBus::new(100);
        assert_eq!(bus.capacity(), 100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_eventbus_subscribe() {
        let bus = EventBus::new(10);
        let _rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn test_eventbus_emit() {
        use std::sync::Arc;
        let bus = Arc::new(EventBus::new(10));
        let mut rx = bus.subscribe();

        let event = MatchEvent::MatchBatchStarted {
            batch_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            total_requests: 25,
            timestamp: chrono::Utc::now(),
        };

        bus.emit(event).expect("emit should succeed");

        let received = rx.try_recv().expect("Should receive event");
        assert_eq!(received.event_type(), "MatchBatchStarted");
    }

    #[test]
    fn test_eventbus_emit_without_subscribers_errors() {
        let bus = EventBus::new(10);
        assert!(bus.emit(sample_progress(1)).is_err());
    }

    #[test]
    fn test_eventbus_emit_lossy() {
        use std::sync::Arc;
        let bus = Arc::new(EventBus::new(2)); // Small capacity
        let mut _rx = bus.subscribe(); // Subscribe but don't receive

        // Fill the channel past capacity
        for i in 0..10 {
            bus.emit_lossy(sample_progress(i)); // Should not panic even when full
        }

        assert_eq!(bus.capacity(), 2);
    }

    #[test]
    fn test_eventbus_multiple_subscribers() {
        use std::sync::Arc;
        let bus = Arc::new(EventBus::new(10));
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        let mut rx3 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 3);

        let event = MatchEvent::CorrectionsIngested {
            project_id: Uuid::new_v4(),
            saved: 3,
            skipped: 1,
            timestamp: chrono::Utc::now(),
        };

        bus.emit(event).expect("emit should succeed");

        let r1 = rx1.try_recv().expect("rx1 should receive");
        let r2 = rx2.try_recv().expect("rx2 should receive");
        let r3 = rx3.try_recv().expect("rx3 should receive");

        assert_eq!(r1.event_type(), "CorrectionsIngested");
        assert_eq!(r2.event_type(), "CorrectionsIngested");
        assert_eq!(r3.event_type(), "CorrectionsIngested");
    }

    #[test]
    fn test_event_serialization_is_type_tagged() {
        let batch_id = Uuid::new_v4();
        let event = MatchEvent::MatchBatchFailed {
            batch_id,
            error_message: "Store unavailable: database is locked".to_string(),
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&event).expect("Event serialization should succeed");
        assert!(json.contains("\"type\":\"MatchBatchFailed\""));
        assert!(json.contains("database is locked"));

        let deserialized: MatchEvent =
            serde_json::from_str(&json).expect("Event deserialization should succeed");
        match deserialized {
            MatchEvent::MatchBatchFailed { batch_id: id, .. } => assert_eq!(id, batch_id),
            other => panic!("Wrong event type deserialized: {}", other.event_type()),
        }
    }

    #[test]
    fn test_event_type_method() {
        let batch_id = Uuid::new_v4();
        let now = chrono::Utc::now();
        let events = vec![
            (
                MatchEvent::MatchBatchStarted {
                    batch_id,
                    project_id: Uuid::new_v4(),
                    total_requests: 10,
                    timestamp: now,
                },
                "MatchBatchStarted",
            ),
            (sample_progress(10), "MatchBatchProgress"),
            (
                MatchEvent::MatchBatchCompleted {
                    batch_id,
                    matched: 8,
                    unresolved: 2,
                    duration_seconds: 1,
                    timestamp: now,
                },
                "MatchBatchCompleted",
            ),
            (
                MatchEvent::MatchBatchCancelled {
                    batch_id,
                    requests_processed: 4,
                    timestamp: now,
                },
                "MatchBatchCancelled",
            ),
        ];

        for (event, expected_type) in events {
            assert_eq!(event.event_type(), expected_type);
        }
    }

    #[test]
    fn test_batch_id_accessor() {
        let batch_id = Uuid::new_v4();
        let event = MatchEvent::MatchBatchCancelled {
            batch_id,
            requests_processed: 0,
            timestamp: chrono::Utc::now(),
        };
        assert_eq!(event.batch_id(), Some(batch_id));

        let event = MatchEvent::CorrectionsIngested {
            project_id: Uuid::new_v4(),
            saved: 0,
            skipped: 0,
            timestamp: chrono::Utc::now(),
        };
        assert_eq!(event.batch_id(), None);
    }
}
