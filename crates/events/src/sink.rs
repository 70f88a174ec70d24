//! Event sink trait and in-process sinks

use crate::event::{EventKind, WalletEvent};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Receiver of wallet notifications.
///
/// `emit` is infallible from the caller's point of view. A sink that can
/// fail (I/O, closed channel) handles and logs the failure itself.
pub trait EventSink: Send + Sync {
    /// Sink name (for logging)
    fn name(&self) -> &str;

    /// Deliver one event
    fn emit(&self, event: &WalletEvent);
}

/// Discards every event
pub struct NullSink;

impl EventSink for NullSink {
    fn name(&self) -> &str {
        "null"
    }

    fn emit(&self, _event: &WalletEvent) {}
}

/// Keeps every event in memory, in emission order
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<WalletEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events received so far
    pub fn events(&self) -> Vec<WalletEvent> {
        self.lock().clone()
    }

    /// Events of one kind, in emission order
    pub fn of_kind(&self, kind: EventKind) -> Vec<WalletEvent> {
        self.lock()
            .iter()
            .filter(|event| event.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave a half-pushed event, so
    // the log stays usable after poisoning.
    fn lock(&self) -> MutexGuard<'_, Vec<WalletEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn emit(&self, event: &WalletEvent) {
        self.lock().push(event.clone());
    }
}

/// Forwards each event to every registered sink, in registration order
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink (builder style)
    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn push(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for FanoutSink {
    fn name(&self) -> &str {
        "fanout"
    }

    fn emit(&self, event: &WalletEvent) {
        for sink in &self.sinks {
            tracing::trace!(sink = sink.name(), kind = ?event.kind(), "Delivering event");
            sink.emit(event);
        }
    }
}
