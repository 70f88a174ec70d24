//! Wallet events emitted by the approval workflow

use chrono::{DateTime, Utc};
use custody_core::{Address, Amount, Payload};
use serde::{Deserialize, Serialize};

/// Notifications published by the wallet, in the order the operations
/// were applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalletEvent {
    /// Value was received from anyone (not owner-gated)
    Deposit {
        sender: Address,
        amount: Amount,
        timestamp: DateTime<Utc>,
    },

    /// An owner proposed a new transaction
    TransactionSubmitted {
        index: u64,
        owner: Address,
        target: Address,
        value: Amount,
        payload: Payload,
        timestamp: DateTime<Utc>,
    },

    /// An owner confirmed a pending transaction
    TransactionConfirmed {
        index: u64,
        owner: Address,
        timestamp: DateTime<Utc>,
    },

    /// A transaction's effect was performed successfully
    TransactionExecuted {
        index: u64,
        executor: Address,
        timestamp: DateTime<Utc>,
    },
}

/// Discriminant of a `WalletEvent`, for filtering and assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Deposit,
    Submitted,
    Confirmed,
    Executed,
}

impl WalletEvent {
    pub fn deposit(sender: Address, amount: Amount) -> Self {
        Self::Deposit {
            sender,
            amount,
            timestamp: Utc::now(),
        }
    }

    pub fn submitted(
        index: u64,
        owner: Address,
        target: Address,
        value: Amount,
        payload: Payload,
    ) -> Self {
        Self::TransactionSubmitted {
            index,
            owner,
            target,
            value,
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn confirmed(index: u64, owner: Address) -> Self {
        Self::TransactionConfirmed {
            index,
            owner,
            timestamp: Utc::now(),
        }
    }

    pub fn executed(index: u64, executor: Address) -> Self {
        Self::TransactionExecuted {
            index,
            executor,
            timestamp: Utc::now(),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            WalletEvent::Deposit { .. } => EventKind::Deposit,
            WalletEvent::TransactionSubmitted { .. } => EventKind::Submitted,
            WalletEvent::TransactionConfirmed { .. } => EventKind::Confirmed,
            WalletEvent::TransactionExecuted { .. } => EventKind::Executed,
        }
    }

    /// Transaction index the event refers to (`None` for deposits)
    pub fn index(&self) -> Option<u64> {
        match self {
            WalletEvent::Deposit { .. } => None,
            WalletEvent::TransactionSubmitted { index, .. }
            | WalletEvent::TransactionConfirmed { index, .. }
            | WalletEvent::TransactionExecuted { index, .. } => Some(*index),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            WalletEvent::Deposit { timestamp, .. }
            | WalletEvent::TransactionSubmitted { timestamp, .. }
            | WalletEvent::TransactionConfirmed { timestamp, .. }
            | WalletEvent::TransactionExecuted { timestamp, .. } => *timestamp,
        }
    }
}
