//! In-memory vault backing the wallet's transfers

use async_trait::async_trait;
use custody_approval::{ExecutorError, TransferExecutor};
use custody_core::{Address, Amount, Payload};
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct VaultState {
    balance: Amount,
    paid_out: HashMap<Address, Amount>,
}

/// Holds the shared fund and pays out executed transactions.
///
/// Deposits credit the balance; each transfer debits it and credits the
/// target, failing with `InsufficientFunds` when the balance is short.
/// Payloads are accepted as-is.
#[derive(Debug, Default)]
pub struct Vault {
    state: Mutex<VaultState>,
}

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn credit(&self, amount: Amount) -> Result<Amount, ExecutorError> {
        let mut state = self.state.lock().await;
        state.balance = state
            .balance
            .checked_add(&amount)
            .ok_or_else(|| ExecutorError::Rejected("vault balance overflow".to_string()))?;
        Ok(state.balance)
    }

    pub async fn balance(&self) -> Amount {
        self.state.lock().await.balance
    }

    /// Total amount paid out to `target` so far
    pub async fn paid_to(&self, target: &Address) -> Amount {
        self.state
            .lock()
            .await
            .paid_out
            .get(target)
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl TransferExecutor for Vault {
    fn name(&self) -> &str {
        "vault"
    }

    async fn transfer(
        &self,
        target: Address,
        value: Amount,
        payload: &Payload,
    ) -> Result<(), ExecutorError> {
        let mut state = self.state.lock().await;

        let remaining = state
            .balance
            .checked_sub(&value)
            .ok_or(ExecutorError::InsufficientFunds {
                requested: value,
                available: state.balance,
            })?;

        let received = state.paid_out.entry(target).or_default();
        *received = received
            .checked_add(&value)
            .ok_or_else(|| ExecutorError::Rejected("payout overflow".to_string()))?;
        state.balance = remaining;

        tracing::debug!(
            target = %target,
            %value,
            payload_len = payload.len(),
            balance = %state.balance,
            "Vault paid out"
        );
        Ok(())
    }
}
