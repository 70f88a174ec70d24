//! Async fan-out of wallet events over a tokio broadcast channel

use crate::event::WalletEvent;
use crate::sink::EventSink;
use tokio::sync::broadcast;

/// Default channel capacity; slow subscribers lag past this many events
pub const DEFAULT_CAPACITY: usize = 1024;

/// Publishes every event to all current subscribers.
///
/// Having no subscribers is not an error: events emitted while nobody
/// listens are dropped. Subscribers that fall more than `capacity` events
/// behind observe `RecvError::Lagged`.
pub struct BroadcastSink {
    sender: broadcast::Sender<WalletEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber; it sees events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventSink for BroadcastSink {
    fn name(&self) -> &str {
        "broadcast"
    }

    fn emit(&self, event: &WalletEvent) {
        if self.sender.send(event.clone()).is_err() {
            tracing::trace!(kind = ?event.kind(), "No broadcast subscribers, event dropped");
        }
    }
}
