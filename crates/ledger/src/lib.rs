//! Custody Ledger - Append-only transaction store
//!
//! Every proposed transaction lives here, addressed by the zero-based index
//! assigned when it was appended. Records are never removed or reordered.
//!
//! The ledger is storage only. It enforces the structural rules of a record
//! (one confirmation per owner, a single transition to `Executed`) but knows
//! nothing about who is allowed to act or how many confirmations are enough;
//! that policy belongs to the approval workflow that owns the ledger.
//!
//! # Key Types
//! - `TransactionLedger`: The ordered store
//! - `Transaction`: One proposed action and its approval state
//! - `TransactionState`: `Pending` with its confirmers, or terminal `Executed`

pub mod error;
pub mod store;
pub mod transaction;

pub use error::LedgerError;
pub use store::{LedgerStats, TransactionLedger};
pub use transaction::{Transaction, TransactionState, TransactionStatus};
