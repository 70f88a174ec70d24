//! Approval workflow - submit, confirm, execute

use crate::error::ApprovalError;
use crate::executor::{ExecutorError, NoopExecutor, TransferExecutor};
use crate::registry::OwnerRegistry;
use custody_core::{Address, Amount, Payload};
use custody_events::{EventSink, NullSink, WalletEvent};
use custody_ledger::{LedgerStats, Transaction, TransactionLedger, TransactionStatus};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Outcome of a successful confirmation
#[derive(Debug, Clone)]
pub struct Confirmation {
    /// Snapshot taken right after the confirmation was recorded
    pub transaction: Transaction,

    /// Whether the transaction can now be executed
    pub quorum_reached: bool,
}

/// Quorum approval state machine over a transaction ledger.
///
/// All mutations take the ledger's write lock for their whole check-and-apply
/// step, so they are linearizable with respect to each other. Reads take the
/// read lock and always see a fully applied state.
pub struct ApprovalWorkflow {
    registry: OwnerRegistry,
    ledger: RwLock<TransactionLedger>,
    executor: Arc<dyn TransferExecutor>,
    events: Arc<dyn EventSink>,
}

impl ApprovalWorkflow {
    pub fn new(
        registry: OwnerRegistry,
        executor: Arc<dyn TransferExecutor>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            registry,
            ledger: RwLock::new(TransactionLedger::new()),
            executor,
            events,
        }
    }

    /// Workflow whose executions do nothing and whose events are discarded
    pub fn with_registry(registry: OwnerRegistry) -> Self {
        Self::new(registry, Arc::new(NoopExecutor), Arc::new(NullSink))
    }

    pub fn registry(&self) -> &OwnerRegistry {
        &self.registry
    }

    pub fn owners(&self) -> &[Address] {
        self.registry.owners()
    }

    pub fn threshold(&self) -> usize {
        self.registry.threshold()
    }

    pub fn is_owner(&self, identity: &Address) -> bool {
        self.registry.is_owner(identity)
    }

    /// Accept incoming value from anyone, including zero.
    ///
    /// Only announces the deposit; custody of the funds themselves belongs
    /// to whatever backs the transfer executor.
    pub async fn receive(&self, sender: Address, amount: Amount) {
        let _guard = self.ledger.write().await;
        tracing::info!(sender = %sender, %amount, "Deposit received");
        self.events.emit(&WalletEvent::deposit(sender, amount));
    }

    /// Propose a new transaction and return its index
    pub async fn submit_transaction(
        &self,
        caller: Address,
        target: Address,
        value: Amount,
        payload: Payload,
    ) -> Result<u64, ApprovalError> {
        self.ensure_owner(caller, "submit")?;

        let mut ledger = self.ledger.write().await;
        let index = ledger.append(caller, target, value, payload.clone());

        tracing::info!(
            index,
            owner = %caller,
            target = %target,
            %value,
            payload_len = payload.len(),
            "Transaction submitted"
        );
        self.events
            .emit(&WalletEvent::submitted(index, caller, target, value, payload));

        Ok(index)
    }

    /// Record the caller's confirmation of a pending transaction
    pub async fn confirm_transaction(
        &self,
        caller: Address,
        index: u64,
    ) -> Result<Confirmation, ApprovalError> {
        self.ensure_owner(caller, "confirm")?;

        let mut ledger = self.ledger.write().await;
        let confirmations = ledger.confirm(index, caller).map_err(|e| {
            let err = ApprovalError::from(e);
            tracing::warn!(index, owner = %caller, code = err.code(), "Confirmation rejected");
            err
        })?;
        let quorum_reached = confirmations >= self.registry.threshold();

        tracing::info!(
            index,
            owner = %caller,
            confirmations,
            threshold = self.registry.threshold(),
            quorum_reached,
            "Transaction confirmed"
        );
        self.events.emit(&WalletEvent::confirmed(index, caller));

        Ok(Confirmation {
            transaction: ledger.get(index)?,
            quorum_reached,
        })
    }

    /// Execute a transaction that has reached quorum.
    ///
    /// The record is marked executed under the lock, the lock is released,
    /// and only then is the executor called on a separate task. Whatever the
    /// executor reports, the transaction stays executed. Cancelling the
    /// returned future does not cancel the transfer.
    pub async fn execute_transaction(
        &self,
        caller: Address,
        index: u64,
    ) -> Result<Transaction, ApprovalError> {
        self.ensure_owner(caller, "execute")?;

        let executed = {
            let mut ledger = self.ledger.write().await;
            let (is_executed, confirmations) = {
                let tx = ledger.entry(index)?;
                (tx.is_executed(), tx.confirmation_count())
            };

            if is_executed {
                tracing::warn!(index, owner = %caller, "Execution rejected: already executed");
                return Err(ApprovalError::AlreadyExecuted(index));
            }

            let threshold = self.registry.threshold();
            if confirmations < threshold {
                tracing::warn!(
                    index,
                    owner = %caller,
                    confirmations,
                    threshold,
                    "Execution rejected: quorum not reached"
                );
                return Err(ApprovalError::InsufficientConfirmations {
                    index,
                    confirmations,
                    threshold,
                });
            }

            ledger.mark_executed(index, caller)?
        };

        // The effect runs on its own task: dropping this future must not
        // strand a consumed transaction whose transfer never happened.
        let executor = Arc::clone(&self.executor);
        let events = Arc::clone(&self.events);
        let effect = tokio::spawn(async move {
            let result = executor
                .transfer(executed.target, executed.value, &executed.payload)
                .await;

            match result {
                Ok(()) => {
                    tracing::info!(
                        index,
                        executor = %caller,
                        target = %executed.target,
                        value = %executed.value,
                        via = executor.name(),
                        "Transaction executed"
                    );
                    events.emit(&WalletEvent::executed(index, caller));
                    Ok(executed)
                }
                Err(source) => {
                    tracing::error!(
                        index,
                        executor = %caller,
                        target = %executed.target,
                        via = executor.name(),
                        error = %source,
                        "Transaction effect failed; transaction stays executed"
                    );
                    Err(ApprovalError::ExecutionFailed { index, source })
                }
            }
        });

        match effect.await {
            Ok(outcome) => outcome,
            Err(join_error) => {
                tracing::error!(
                    index,
                    executor = %caller,
                    error = %join_error,
                    "Transaction effect aborted; transaction stays executed"
                );
                Err(ApprovalError::ExecutionFailed {
                    index,
                    source: ExecutorError::Aborted(join_error.to_string()),
                })
            }
        }
    }

    /// Number of transactions ever submitted
    pub async fn transaction_count(&self) -> u64 {
        self.ledger.read().await.count()
    }

    /// Snapshot of the transaction at `index`
    pub async fn transaction_at(&self, index: u64) -> Result<Transaction, ApprovalError> {
        Ok(self.ledger.read().await.get(index)?)
    }

    /// Whether `owner` has confirmed the transaction at `index`
    pub async fn is_confirmed(&self, index: u64, owner: &Address) -> Result<bool, ApprovalError> {
        let ledger = self.ledger.read().await;
        Ok(ledger.entry(index)?.is_confirmed_by(owner))
    }

    /// Owners that confirmed the transaction at `index`
    pub async fn confirmers(&self, index: u64) -> Result<Vec<Address>, ApprovalError> {
        let ledger = self.ledger.read().await;
        Ok(ledger.entry(index)?.confirmers())
    }

    /// All transactions, optionally filtered by status, in index order
    pub async fn list(&self, status: Option<TransactionStatus>) -> Vec<Transaction> {
        let ledger = self.ledger.read().await;
        match status {
            Some(status) => ledger.list_by_status(status),
            None => ledger.iter().cloned().collect(),
        }
    }

    /// Pending transactions in index order
    pub async fn list_pending(&self) -> Vec<Transaction> {
        self.list(Some(TransactionStatus::Pending)).await
    }

    pub async fn stats(&self) -> LedgerStats {
        self.ledger.read().await.stats()
    }

    fn ensure_owner(&self, caller: Address, action: &'static str) -> Result<(), ApprovalError> {
        if self.registry.is_owner(&caller) {
            Ok(())
        } else {
            tracing::warn!(caller = %caller, action, "Unauthorized caller");
            Err(ApprovalError::Unauthorized(caller))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_events::{EventKind, MemorySink};

    fn addr(label: &str) -> Address {
        Address::from_label(label)
    }

    fn workflow(labels: &[&str], threshold: usize) -> (ApprovalWorkflow, Arc<MemorySink>) {
        let owners = labels.iter().map(|l| addr(l)).collect();
        let registry = OwnerRegistry::new(owners, threshold).unwrap();
        let sink = Arc::new(MemorySink::new());
        let workflow = ApprovalWorkflow::new(registry, Arc::new(NoopExecutor), sink.clone());
        (workflow, sink)
    }

    #[tokio::test]
    async fn test_submit_creates_pending_record() {
        let (wallet, sink) = workflow(&["alice", "bob"], 2);

        let index = wallet
            .submit_transaction(
                addr("alice"),
                addr("dave"),
                Amount::from_units(5),
                Payload::empty(),
            )
            .await
            .unwrap();

        assert_eq!(index, 0);
        assert_eq!(wallet.transaction_count().await, 1);

        let tx = wallet.transaction_at(0).await.unwrap();
        assert_eq!(tx.confirmation_count(), 0);
        assert!(!tx.is_executed());
        assert_eq!(tx.submitter, addr("alice"));
        assert_eq!(sink.of_kind(EventKind::Submitted).len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_reports_quorum() {
        let (wallet, _) = workflow(&["alice", "bob", "carol"], 2);
        wallet
            .submit_transaction(addr("alice"), addr("dave"), Amount::ZERO, Payload::empty())
            .await
            .unwrap();

        let first = wallet.confirm_transaction(addr("bob"), 0).await.unwrap();
        assert!(!first.quorum_reached);
        assert_eq!(first.transaction.confirmation_count(), 1);

        let second = wallet.confirm_transaction(addr("carol"), 0).await.unwrap();
        assert!(second.quorum_reached);
        assert_eq!(second.transaction.confirmers().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_index() {
        let (wallet, _) = workflow(&["alice"], 1);

        assert!(matches!(
            wallet.confirm_transaction(addr("alice"), 0).await,
            Err(ApprovalError::NotFound { index: 0, count: 0 })
        ));
        assert!(matches!(
            wallet.execute_transaction(addr("alice"), 7).await,
            Err(ApprovalError::NotFound { index: 7, .. })
        ));
        assert!(matches!(
            wallet.transaction_at(0).await,
            Err(ApprovalError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_receive_is_open_to_anyone() {
        let (wallet, sink) = workflow(&["alice"], 1);

        wallet.receive(addr("stranger"), Amount::ZERO).await;

        let deposits = sink.of_kind(EventKind::Deposit);
        assert_eq!(deposits.len(), 1);
        assert!(matches!(
            deposits[0],
            WalletEvent::Deposit { sender, amount, .. }
                if sender == addr("stranger") && amount.is_zero()
        ));
    }

    #[tokio::test]
    async fn test_list_and_stats() {
        let (wallet, _) = workflow(&["alice"], 1);
        for _ in 0..3 {
            wallet
                .submit_transaction(addr("alice"), addr("dave"), Amount::ZERO, Payload::empty())
                .await
                .unwrap();
        }
        wallet.confirm_transaction(addr("alice"), 1).await.unwrap();
        wallet.execute_transaction(addr("alice"), 1).await.unwrap();

        let pending: Vec<u64> = wallet.list_pending().await.iter().map(|tx| tx.index).collect();
        assert_eq!(pending, vec![0, 2]);
        assert_eq!(wallet.list(None).await.len(), 3);
        assert_eq!(wallet.list(Some(TransactionStatus::Executed)).await[0].index, 1);

        let stats = wallet.stats().await;
        assert_eq!((stats.total, stats.pending, stats.executed), (3, 2, 1));
    }
}
