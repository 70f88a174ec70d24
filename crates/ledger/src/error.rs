//! Ledger errors

use custody_core::Address;
use thiserror::Error;

/// Structural violations detected by the ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Transaction {index} not found (ledger holds {count})")]
    NotFound { index: u64, count: u64 },

    #[error("Transaction {0} already executed")]
    AlreadyExecuted(u64),

    #[error("Transaction {index} already confirmed by {owner}")]
    AlreadyConfirmed { index: u64, owner: Address },
}
