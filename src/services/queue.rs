//! Unbounded FIFO event queue between producers and the engine.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;

use crate::domain::models::Event;

/// Fire-and-forget buffer with one logical consumer. `publish` never
/// blocks the caller; `dequeue` awaits the next item. Queue order is pure
/// arrival order — severity is only known after classification, so there
/// is no priority reordering.
pub struct EventQueue {
    tx: UnboundedSender<Event>,
    rx: Mutex<UnboundedReceiver<Event>>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx: Mutex::new(rx) }
    }

    /// Enqueue without waiting for processing. The only guarantee to the
    /// caller is "accepted"; an event published after the consumer is gone
    /// is silently dropped.
    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Next event in arrival order. `None` once every publisher handle is
    /// dropped and the buffer drains, which ends the consumer loop.
    pub async fn dequeue(&self) -> Option<Event> {
        self.rx.lock().await.recv().await
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
