//! Custody Events - Wallet notifications
//!
//! The approval workflow announces every deposit, submission, confirmation
//! and execution as a `WalletEvent`. Delivery is fire-and-forget: a sink can
//! never veto or fail an operation, it only observes it.
//!
//! # Sinks
//! - `MemorySink`: ordered in-memory log
//! - `BroadcastSink`: tokio broadcast fan-out to async subscribers
//! - `JsonlSink`: append-only JSON Lines file, replayable with `EventReader`
//! - `FanoutSink`: forwards to several sinks in registration order

pub mod broadcast;
pub mod error;
pub mod event;
pub mod reader;
pub mod sink;
pub mod store;

pub use broadcast::BroadcastSink;
pub use error::EventError;
pub use event::{EventKind, WalletEvent};
pub use reader::EventReader;
pub use sink::{EventSink, FanoutSink, MemorySink, NullSink};
pub use store::JsonlSink;
