//! Approval errors

use crate::executor::ExecutorError;
use custody_core::Address;
use custody_ledger::LedgerError;
use thiserror::Error;

/// Construction-time configuration violations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Owner list is empty")]
    EmptyOwners,

    #[error("Threshold must be at least 1")]
    ZeroThreshold,

    #[error("Threshold {threshold} exceeds owner count {owners}")]
    ThresholdTooHigh { threshold: usize, owners: usize },

    #[error("Owner at position {0} is the null address")]
    NullOwner(usize),

    #[error("Duplicate owner: {0}")]
    DuplicateOwner(Address),

    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from the approval workflow
#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("Caller {0} is not an owner")]
    Unauthorized(Address),

    #[error("Transaction {index} not found (count = {count})")]
    NotFound { index: u64, count: u64 },

    #[error("Transaction {0} already executed")]
    AlreadyExecuted(u64),

    #[error("Transaction {index} already confirmed by {owner}")]
    AlreadyConfirmedByCaller { index: u64, owner: Address },

    #[error("Transaction {index} has {confirmations} of {threshold} required confirmations")]
    InsufficientConfirmations {
        index: u64,
        confirmations: usize,
        threshold: usize,
    },

    #[error("Transaction {index} execution failed: {source}")]
    ExecutionFailed {
        index: u64,
        #[source]
        source: ExecutorError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
}

impl From<LedgerError> for ApprovalError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound { index, count } => ApprovalError::NotFound { index, count },
            LedgerError::AlreadyExecuted(index) => ApprovalError::AlreadyExecuted(index),
            LedgerError::AlreadyConfirmed { index, owner } => {
                ApprovalError::AlreadyConfirmedByCaller { index, owner }
            }
        }
    }
}

impl ApprovalError {
    /// Short stable code for tooling output
    pub fn code(&self) -> &'static str {
        match self {
            ApprovalError::Unauthorized(_) => "UNAUTHORIZED",
            ApprovalError::NotFound { .. } => "NOT_FOUND",
            ApprovalError::AlreadyExecuted(_) => "ALREADY_EXECUTED",
            ApprovalError::AlreadyConfirmedByCaller { .. } => "ALREADY_CONFIRMED",
            ApprovalError::InsufficientConfirmations { .. } => "INSUFFICIENT_CONFIRMATIONS",
            ApprovalError::ExecutionFailed { .. } => "EXECUTION_FAILED",
            ApprovalError::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
        }
    }
}
