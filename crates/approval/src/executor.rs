//! External effect performed when a transaction executes

use async_trait::async_trait;
use custody_core::{Address, Amount, Payload};
use thiserror::Error;

/// Failure reported by a transfer executor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    #[error("Target rejected the call: {0}")]
    Rejected(String),

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Amount, available: Amount },

    #[error("Target unreachable: {0}")]
    Unreachable(String),

    #[error("Transfer did not complete: {0}")]
    Aborted(String),
}

/// Performs the value transfer and/or call of an executed transaction.
///
/// Implementations are untrusted from the workflow's point of view: they may
/// fail, and they may call back into the workflow. The workflow commits the
/// terminal state before calling `transfer` and holds no lock while it runs.
/// The call runs on its own task, so it completes even if the caller that
/// triggered execution goes away.
#[async_trait]
pub trait TransferExecutor: Send + Sync {
    /// Executor name (for logging)
    fn name(&self) -> &str;

    /// Send `value` to `target` with `payload` as call data
    async fn transfer(
        &self,
        target: Address,
        value: Amount,
        payload: &Payload,
    ) -> Result<(), ExecutorError>;
}

/// Accepts every transfer without doing anything (for testing)
pub struct NoopExecutor;

#[async_trait]
impl TransferExecutor for NoopExecutor {
    fn name(&self) -> &str {
        "noop"
    }

    async fn transfer(
        &self,
        _target: Address,
        _value: Amount,
        _payload: &Payload,
    ) -> Result<(), ExecutorError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_executor_accepts() {
        let executor = NoopExecutor;
        let result = executor
            .transfer(Address::from_label("dave"), Amount::from_units(5), &Payload::empty())
            .await;
        assert!(result.is_ok());
        assert_eq!(executor.name(), "noop");
    }

    #[test]
    fn test_insufficient_funds_message() {
        let err = ExecutorError::InsufficientFunds {
            requested: Amount::from_units(5),
            available: Amount::from_units(2),
        };
        assert_eq!(err.to_string(), "Insufficient funds: requested 5, available 2");
    }
}
