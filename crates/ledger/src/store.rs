//! In-memory append-only transaction ledger

use crate::error::LedgerError;
use crate::transaction::{Transaction, TransactionState, TransactionStatus};
use chrono::Utc;
use custody_core::{Address, Amount, Payload};
use std::mem;

/// Append-only store of transactions.
///
/// Indexes are dense and start at zero; the record at index `i` is the
/// `i`-th one ever appended.
#[derive(Debug, Default)]
pub struct TransactionLedger {
    transactions: Vec<Transaction>,
}

/// Summary counts over the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerStats {
    pub total: usize,
    pub pending: usize,
    pub executed: usize,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new pending transaction and return its index
    pub fn append(
        &mut self,
        submitter: Address,
        target: Address,
        value: Amount,
        payload: Payload,
    ) -> u64 {
        let index = self.transactions.len() as u64;
        self.transactions
            .push(Transaction::new(index, submitter, target, value, payload));
        index
    }

    /// Snapshot of the transaction at `index`
    pub fn get(&self, index: u64) -> Result<Transaction, LedgerError> {
        self.entry(index).cloned()
    }

    /// Borrow the transaction at `index` without cloning
    pub fn entry(&self, index: u64) -> Result<&Transaction, LedgerError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.transactions.get(i))
            .ok_or(LedgerError::NotFound {
                index,
                count: self.count(),
            })
    }

    /// Number of transactions ever appended
    pub fn count(&self) -> u64 {
        self.transactions.len() as u64
    }

    /// Record `owner`'s confirmation and return the new confirmation count.
    ///
    /// Internal mutation for the approval workflow; no authorization check
    /// is made here.
    pub fn confirm(&mut self, index: u64, owner: Address) -> Result<usize, LedgerError> {
        let tx = self.entry_mut(index)?;
        match &mut tx.state {
            TransactionState::Executed { .. } => Err(LedgerError::AlreadyExecuted(index)),
            TransactionState::Pending { confirmations } => {
                if !confirmations.insert(owner) {
                    return Err(LedgerError::AlreadyConfirmed { index, owner });
                }
                Ok(confirmations.len())
            }
        }
    }

    /// Move the transaction to `Executed` and return the executed snapshot.
    ///
    /// Internal mutation for the approval workflow; the quorum check is the
    /// caller's responsibility.
    pub fn mark_executed(
        &mut self,
        index: u64,
        executor: Address,
    ) -> Result<Transaction, LedgerError> {
        let tx = self.entry_mut(index)?;
        let confirmations = match &mut tx.state {
            TransactionState::Executed { .. } => return Err(LedgerError::AlreadyExecuted(index)),
            TransactionState::Pending { confirmations } => mem::take(confirmations),
        };

        tx.state = TransactionState::Executed {
            confirmations,
            executor,
            executed_at: Utc::now(),
        };

        Ok(tx.clone())
    }

    /// Iterate over all transactions in index order
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    /// Snapshots of every transaction with the given status
    pub fn list_by_status(&self, status: TransactionStatus) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|tx| tx.status() == status)
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> LedgerStats {
        let executed = self.transactions.iter().filter(|tx| tx.is_executed()).count();
        LedgerStats {
            total: self.transactions.len(),
            pending: self.transactions.len() - executed,
            executed,
        }
    }

    fn entry_mut(&mut self, index: u64) -> Result<&mut Transaction, LedgerError> {
        let count = self.count();
        usize::try_from(index)
            .ok()
            .and_then(|i| self.transactions.get_mut(i))
            .ok_or(LedgerError::NotFound { index, count })
    }
}
