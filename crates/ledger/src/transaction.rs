//! Transaction records and their approval state

use chrono::{DateTime, Utc};
use custody_core::{Address, Amount, Payload};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum_macros::{Display, EnumString};

/// Lifecycle status of a transaction, without the confirmation detail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Collecting confirmations
    Pending,
    /// Terminal; the external effect has been attempted
    Executed,
}

/// Approval state of a transaction.
///
/// The confirmation count is always the size of the confirmer set, so the
/// stored count and the set of confirming owners cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TransactionState {
    Pending {
        confirmations: BTreeSet<Address>,
    },
    Executed {
        /// Confirmers at the moment of execution, frozen from then on
        confirmations: BTreeSet<Address>,
        executor: Address,
        executed_at: DateTime<Utc>,
    },
}

impl TransactionState {
    pub fn status(&self) -> TransactionStatus {
        match self {
            TransactionState::Pending { .. } => TransactionStatus::Pending,
            TransactionState::Executed { .. } => TransactionStatus::Executed,
        }
    }

    pub fn confirmations(&self) -> &BTreeSet<Address> {
        match self {
            TransactionState::Pending { confirmations }
            | TransactionState::Executed { confirmations, .. } => confirmations,
        }
    }
}

/// One proposed transfer or external call.
///
/// Values of this type handed out by the ledger are snapshots: they do not
/// follow later confirmations or execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Position in the ledger, assigned at append time
    pub index: u64,

    /// Recipient of the value and the payload
    pub target: Address,

    /// Amount transferred out of the fund on execution
    pub value: Amount,

    /// Call data delivered to the target (possibly empty)
    pub payload: Payload,

    /// Owner that submitted the transaction
    pub submitter: Address,

    pub submitted_at: DateTime<Utc>,

    pub state: TransactionState,
}

impl Transaction {
    /// Create a fresh pending transaction with no confirmations
    pub fn new(
        index: u64,
        submitter: Address,
        target: Address,
        value: Amount,
        payload: Payload,
    ) -> Self {
        Self {
            index,
            target,
            value,
            payload,
            submitter,
            submitted_at: Utc::now(),
            state: TransactionState::Pending {
                confirmations: BTreeSet::new(),
            },
        }
    }

    pub fn status(&self) -> TransactionStatus {
        self.state.status()
    }

    pub fn is_executed(&self) -> bool {
        matches!(self.state, TransactionState::Executed { .. })
    }

    /// Number of distinct owners that confirmed this transaction
    pub fn confirmation_count(&self) -> usize {
        self.state.confirmations().len()
    }

    /// Confirming owners, in address order
    pub fn confirmers(&self) -> Vec<Address> {
        self.state.confirmations().iter().copied().collect()
    }

    pub fn is_confirmed_by(&self, owner: &Address) -> bool {
        self.state.confirmations().contains(owner)
    }

    /// Owner that triggered execution, if executed
    pub fn executor(&self) -> Option<Address> {
        match &self.state {
            TransactionState::Executed { executor, .. } => Some(*executor),
            TransactionState::Pending { .. } => None,
        }
    }
}
