//! Best-effort broadcast of results to connected observers.
//!
//! Observer failures never propagate back into the engine: sends ignore
//! the no-subscriber case, and a slow subscriber lags (dropping its oldest
//! messages) rather than stalling the core.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::domain::models::{ActionLogEntry, TriageRecord};
use crate::domain::ports::LogEmitter;

/// One observer-facing message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Notice {
    /// An action log entry was written.
    Log(ActionLogEntry),
    /// An event finished the pipeline.
    Triage(TriageRecord),
    /// A safety incident was resolved.
    SafetyResolved { id: String },
}

/// Fire-and-forget fanout over a broadcast channel.
#[derive(Clone)]
pub struct Fanout {
    sender: broadcast::Sender<Notice>,
}

impl Fanout {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe an observer. Each receiver is isolated: dropping it or
    /// falling behind affects only that observer.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    /// Publish a notice. Send errors (no subscribers) are ignored.
    pub fn publish(&self, notice: Notice) {
        let _ = self.sender.send(notice);
    }

    pub fn triage(&self, record: TriageRecord) {
        self.publish(Notice::Triage(record));
    }

    pub fn safety_resolved(&self, id: impl Into<String>) {
        self.publish(Notice::SafetyResolved { id: id.into() });
    }
}

impl LogEmitter for Fanout {
    fn log_written(&self, entry: &ActionLogEntry) {
        self.publish(Notice::Log(entry.clone()));
    }
}
