//! # Custody Approval Module
//!
//! Quorum approval for a jointly held fund.
//!
//! A fixed set of owners, fixed at construction together with a threshold,
//! must confirm every outgoing transfer or call before it runs:
//!
//! ```text
//! submit ──► Pending { confirmations: {} }
//!               │  confirm (each owner at most once)
//!               ▼
//!            Pending { confirmations: {A, B, ..} }
//!               │  execute (any owner, once |confirmations| >= threshold)
//!               ▼
//!            Executed ──► external effect (exactly one attempt)
//! ```
//!
//! ## Guarantees
//! - Mutations are serialized behind one lock; reads never observe a
//!   half-applied operation
//! - The record becomes `Executed` before the effect runs, and the effect
//!   runs outside the lock, so a reentrant execute sees `AlreadyExecuted`
//! - A failed effect still consumes the transaction

mod config;
mod error;
mod executor;
mod registry;
mod workflow;

pub use config::WalletConfig;
pub use error::{ApprovalError, ConfigError};
pub use executor::{ExecutorError, NoopExecutor, TransferExecutor};
pub use registry::OwnerRegistry;
pub use workflow::{ApprovalWorkflow, Confirmation};
