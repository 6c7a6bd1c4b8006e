//! Progress events emitted by workflow steps
//!
//! Each step writes into its own channel; the orchestrator relays events to
//! the caller's sink in emission order, fully draining one step before the
//! next starts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

/// A single progress event from an active step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepEvent {
    /// Name of the step that produced the event
    pub step: String,
    /// Human-readable progress message
    pub message: String,
    /// Emission timestamp
    pub at: DateTime<Utc>,
}

impl StepEvent {
    pub fn new(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            message: message.into(),
            at: Utc::now(),
        }
    }
}

/// Sending half of an event channel
///
/// A dropped receiver is not an error: events are progress reporting, never
/// control flow.
#[derive(Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<StepEvent>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<StepEvent>) -> Self {
        Self { tx }
    }

    /// Create a connected sink/receiver pair
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StepEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Emit a progress event
    pub fn emit(&self, step: &str, message: impl Into<String>) {
        self.forward(StepEvent::new(step, message));
    }

    /// Forward an already-built event unchanged
    pub fn forward(&self, event: StepEvent) {
        if self.tx.send(event).is_err() {
            debug!("Event receiver dropped; discarding step event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_emission_order() {
        let (sink, mut rx) = EventSink::channel();
        sink.emit("retrieval", "first");
        sink.emit("retrieval", "second");
        drop(sink);

        assert_eq!(rx.recv().await.unwrap().message, "first");
        assert_eq!(rx.recv().await.unwrap().message, "second");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_emit_after_receiver_dropped_is_silent() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.emit("retrieval", "into the void");
    }
}
