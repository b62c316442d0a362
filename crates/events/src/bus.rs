//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`ScanEvent`]s. The
//! orchestrator publishes every lifecycle transition and per-target
//! outcome here; consumers (request handlers, notification plumbing,
//! tests) subscribe without coupling to the orchestrator itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use vigil_core::types::DbId;

/// Broadcast channel capacity. Slow subscribers that fall further
/// behind than this lose the oldest events (`RecvError::Lagged`).
const EVENT_CHANNEL_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// ScanEvent
// ---------------------------------------------------------------------------

/// A scan lifecycle event.
///
/// Constructed via [`ScanEvent::new`] and enriched with
/// [`with_endpoint`](ScanEvent::with_endpoint) and
/// [`with_payload`](ScanEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvent {
    /// Dot-separated event name, e.g. `"scan.completed"`.
    pub event_type: String,

    /// The scan this event belongs to.
    pub scan_id: DbId,

    /// The target endpoint, for per-target events.
    pub endpoint_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ScanEvent {
    /// Create a new event for a scan.
    pub fn new(event_type: impl Into<String>, scan_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            scan_id,
            endpoint_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the target endpoint to the event.
    pub fn with_endpoint(mut self, endpoint_id: DbId) -> Self {
        self.endpoint_id = Some(endpoint_id);
        self
    }

    /// Attach a payload to the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Central publish/subscribe hub, shared via `Arc<EventBus>`.
pub struct EventBus {
    tx: broadcast::Sender<ScanEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }
}

impl EventBus {
    /// Publish an event to all current subscribers.
    ///
    /// Events published while nobody is subscribed are dropped; the bus
    /// is a notification channel, not a durable log.
    pub fn publish(&self, event: ScanEvent) {
        let _ = self.tx.send(event);
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.tx.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            ScanEvent::new("scan.started", 42)
                .with_payload(serde_json::json!({ "targets": 3 })),
        );

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, "scan.started");
        assert_eq!(event.scan_id, 42);
        assert_eq!(event.payload["targets"], 3);
    }

    #[tokio::test]
    async fn per_target_events_carry_endpoint() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(ScanEvent::new("scan.target_failed", 1).with_endpoint(7));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.endpoint_id, Some(7));
    }

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let bus = EventBus::default();
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(ScanEvent::new("scan.completed", 9));
    }
}
