//! Integration tests for the quorum approval workflow
//!
//! These drive the full submit → confirm → execute flow with recording and
//! hostile executors, and check the event stream that comes out of it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use custody_approval::{
    ApprovalError, ApprovalWorkflow, ConfigError, ExecutorError, OwnerRegistry, TransferExecutor,
    WalletConfig,
};
use custody_core::{Address, Amount, Payload};
use custody_events::{EventKind, MemorySink, WalletEvent};

fn addr(label: &str) -> Address {
    Address::from_label(label)
}

fn registry(labels: &[&str], threshold: usize) -> OwnerRegistry {
    OwnerRegistry::new(labels.iter().map(|l| addr(l)).collect(), threshold).unwrap()
}

/// Records every transfer it is asked to perform
#[derive(Default)]
struct RecordingExecutor {
    calls: Mutex<Vec<(Address, Amount, Payload)>>,
}

impl RecordingExecutor {
    fn calls(&self) -> Vec<(Address, Amount, Payload)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransferExecutor for RecordingExecutor {
    fn name(&self) -> &str {
        "recording"
    }

    async fn transfer(
        &self,
        target: Address,
        value: Amount,
        payload: &Payload,
    ) -> Result<(), ExecutorError> {
        self.calls.lock().unwrap().push((target, value, payload.clone()));
        Ok(())
    }
}

/// Rejects every call and counts the attempts
#[derive(Default)]
struct RejectingExecutor {
    attempts: AtomicUsize,
}

#[async_trait]
impl TransferExecutor for RejectingExecutor {
    fn name(&self) -> &str {
        "rejecting"
    }

    async fn transfer(
        &self,
        _target: Address,
        _value: Amount,
        _payload: &Payload,
    ) -> Result<(), ExecutorError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ExecutorError::Rejected("target reverted".to_string()))
    }
}

/// Takes a while to finish, like a transfer to a slow remote target
#[derive(Default)]
struct SlowExecutor {
    started: AtomicUsize,
    completed: AtomicUsize,
}

#[async_trait]
impl TransferExecutor for SlowExecutor {
    fn name(&self) -> &str {
        "slow"
    }

    async fn transfer(
        &self,
        _target: Address,
        _value: Amount,
        _payload: &Payload,
    ) -> Result<(), ExecutorError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(200)).await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A target that tries to execute the same transaction again from inside
/// its own effect
struct ReentrantExecutor {
    wallet: OnceLock<Arc<ApprovalWorkflow>>,
    attacker: Address,
    index: u64,
    effects: AtomicUsize,
    reentry: Mutex<Option<Result<(), String>>>,
}

#[async_trait]
impl TransferExecutor for ReentrantExecutor {
    fn name(&self) -> &str {
        "reentrant"
    }

    async fn transfer(
        &self,
        _target: Address,
        _value: Amount,
        _payload: &Payload,
    ) -> Result<(), ExecutorError> {
        self.effects.fetch_add(1, Ordering::SeqCst);
        let wallet = self.wallet.get().expect("wallet installed").clone();
        let outcome = wallet
            .execute_transaction(self.attacker, self.index)
            .await
            .map(|_| ())
            .map_err(|e| e.code().to_string());
        *self.reentry.lock().unwrap() = Some(outcome);
        Ok(())
    }
}

/// Scenario: owners [A, B, C], threshold 2.
/// A submits (D, 5); B confirms; A confirms; C executes; B executes again.
#[tokio::test]
async fn test_two_of_three_full_flow() {
    let executor = Arc::new(RecordingExecutor::default());
    let sink = Arc::new(MemorySink::new());
    let wallet = ApprovalWorkflow::new(
        registry(&["a", "b", "c"], 2),
        executor.clone(),
        sink.clone(),
    );

    let index = wallet
        .submit_transaction(addr("a"), addr("d"), Amount::from_units(5), Payload::empty())
        .await
        .unwrap();
    assert_eq!(index, 0);

    let confirmation = wallet.confirm_transaction(addr("b"), 0).await.unwrap();
    assert_eq!(confirmation.transaction.confirmation_count(), 1);

    let confirmation = wallet.confirm_transaction(addr("a"), 0).await.unwrap();
    assert_eq!(confirmation.transaction.confirmation_count(), 2);

    let executed = wallet.execute_transaction(addr("c"), 0).await.unwrap();
    assert!(executed.is_executed());
    assert_eq!(executed.executor(), Some(addr("c")));
    assert_eq!(executor.calls(), vec![(addr("d"), Amount::from_units(5), Payload::empty())]);

    let again = wallet.execute_transaction(addr("b"), 0).await;
    assert!(matches!(again, Err(ApprovalError::AlreadyExecuted(0))));
    assert_eq!(executor.calls().len(), 1);

    let kinds: Vec<EventKind> = sink.events().iter().map(WalletEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Submitted,
            EventKind::Confirmed,
            EventKind::Confirmed,
            EventKind::Executed,
        ]
    );
}

/// Scenario: owners [A, B], threshold 2. A submits and confirms; B cannot
/// execute with one confirmation.
#[tokio::test]
async fn test_execute_before_quorum() {
    let executor = Arc::new(RecordingExecutor::default());
    let wallet = ApprovalWorkflow::new(
        registry(&["a", "b"], 2),
        executor.clone(),
        Arc::new(MemorySink::new()),
    );

    wallet
        .submit_transaction(addr("a"), addr("d"), Amount::from_units(1), Payload::empty())
        .await
        .unwrap();
    wallet.confirm_transaction(addr("a"), 0).await.unwrap();

    let result = wallet.execute_transaction(addr("b"), 0).await;
    assert!(matches!(
        result,
        Err(ApprovalError::InsufficientConfirmations {
            index: 0,
            confirmations: 1,
            threshold: 2
        })
    ));
    assert!(executor.calls().is_empty());
    assert!(!wallet.transaction_at(0).await.unwrap().is_executed());

    wallet.confirm_transaction(addr("b"), 0).await.unwrap();
    wallet.execute_transaction(addr("b"), 0).await.unwrap();
    assert_eq!(executor.calls().len(), 1);
}

#[tokio::test]
async fn test_double_confirmation_fails_loudly() {
    let sink = Arc::new(MemorySink::new());
    let wallet = ApprovalWorkflow::new(
        registry(&["a", "b", "c"], 3),
        Arc::new(RecordingExecutor::default()),
        sink.clone(),
    );
    wallet
        .submit_transaction(addr("a"), addr("d"), Amount::ZERO, Payload::empty())
        .await
        .unwrap();

    wallet.confirm_transaction(addr("b"), 0).await.unwrap();
    let second = wallet.confirm_transaction(addr("b"), 0).await;

    assert!(matches!(
        second,
        Err(ApprovalError::AlreadyConfirmedByCaller { index: 0, owner }) if owner == addr("b")
    ));
    assert_eq!(wallet.transaction_at(0).await.unwrap().confirmation_count(), 1);
    assert_eq!(sink.of_kind(EventKind::Confirmed).len(), 1);
}

#[tokio::test]
async fn test_non_owner_is_rejected_but_can_read() {
    let wallet = ApprovalWorkflow::with_registry(registry(&["a", "b"], 1));
    let mallory = addr("mallory");

    assert!(matches!(
        wallet
            .submit_transaction(mallory, mallory, Amount::from_units(100), Payload::empty())
            .await,
        Err(ApprovalError::Unauthorized(caller)) if caller == mallory
    ));

    wallet
        .submit_transaction(addr("a"), addr("d"), Amount::ZERO, Payload::empty())
        .await
        .unwrap();

    assert!(matches!(
        wallet.confirm_transaction(mallory, 0).await,
        Err(ApprovalError::Unauthorized(_))
    ));
    wallet.confirm_transaction(addr("a"), 0).await.unwrap();
    assert!(matches!(
        wallet.execute_transaction(mallory, 0).await,
        Err(ApprovalError::Unauthorized(_))
    ));

    // Reads are open to everyone
    assert_eq!(wallet.transaction_count().await, 1);
    assert!(!wallet.transaction_at(0).await.unwrap().is_executed());
}

#[tokio::test]
async fn test_unauthorized_checked_before_index() {
    let wallet = ApprovalWorkflow::with_registry(registry(&["a"], 1));

    assert!(matches!(
        wallet.confirm_transaction(addr("mallory"), 42).await,
        Err(ApprovalError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_confirm_after_execution() {
    let wallet = ApprovalWorkflow::with_registry(registry(&["a", "b"], 1));
    wallet
        .submit_transaction(addr("a"), addr("d"), Amount::ZERO, Payload::empty())
        .await
        .unwrap();
    wallet.confirm_transaction(addr("a"), 0).await.unwrap();
    wallet.execute_transaction(addr("a"), 0).await.unwrap();

    assert!(matches!(
        wallet.confirm_transaction(addr("b"), 0).await,
        Err(ApprovalError::AlreadyExecuted(0))
    ));
    assert_eq!(wallet.confirmers(0).await.unwrap(), vec![addr("a")]);
}

#[tokio::test]
async fn test_confirmer_gets_already_executed_after_execution() {
    let wallet = ApprovalWorkflow::with_registry(registry(&["a", "b"], 1));
    wallet
        .submit_transaction(addr("a"), addr("d"), Amount::ZERO, Payload::empty())
        .await
        .unwrap();
    wallet.confirm_transaction(addr("a"), 0).await.unwrap();
    wallet.execute_transaction(addr("b"), 0).await.unwrap();

    // Executed takes precedence over the caller's earlier confirmation
    assert!(matches!(
        wallet.confirm_transaction(addr("a"), 0).await,
        Err(ApprovalError::AlreadyExecuted(0))
    ));
}

#[tokio::test]
async fn test_payload_reaches_executor() {
    let executor = Arc::new(RecordingExecutor::default());
    let wallet = ApprovalWorkflow::new(
        registry(&["a", "b"], 2),
        executor.clone(),
        Arc::new(MemorySink::new()),
    );
    let payload: Payload = "0xa9059cbb00000001".parse().unwrap();

    wallet
        .submit_transaction(addr("a"), addr("token"), Amount::ZERO, payload.clone())
        .await
        .unwrap();
    wallet.confirm_transaction(addr("a"), 0).await.unwrap();
    wallet.confirm_transaction(addr("b"), 0).await.unwrap();
    let executed = wallet.execute_transaction(addr("b"), 0).await.unwrap();

    assert_eq!(executed.payload, payload);
    assert_eq!(executor.calls(), vec![(addr("token"), Amount::ZERO, payload)]);
}

#[tokio::test]
async fn test_cancelled_caller_does_not_cancel_transfer() {
    let executor = Arc::new(SlowExecutor::default());
    let sink = Arc::new(MemorySink::new());
    let wallet = ApprovalWorkflow::new(registry(&["a", "b"], 1), executor.clone(), sink.clone());

    wallet
        .submit_transaction(addr("a"), addr("d"), Amount::from_units(2), Payload::empty())
        .await
        .unwrap();
    wallet.confirm_transaction(addr("b"), 0).await.unwrap();

    // The caller gives up long before the transfer finishes
    let timed_out =
        tokio::time::timeout(Duration::from_millis(20), wallet.execute_transaction(addr("a"), 0))
            .await;
    assert!(timed_out.is_err());
    assert!(wallet.transaction_at(0).await.unwrap().is_executed());

    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(executor.started.load(Ordering::SeqCst), 1);
    assert_eq!(executor.completed.load(Ordering::SeqCst), 1);
    assert_eq!(sink.of_kind(EventKind::Executed).len(), 1);
    assert!(matches!(
        wallet.execute_transaction(addr("b"), 0).await,
        Err(ApprovalError::AlreadyExecuted(0))
    ));
    assert_eq!(executor.started.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_effect_consumes_transaction() {
    let executor = Arc::new(RejectingExecutor::default());
    let sink = Arc::new(MemorySink::new());
    let wallet = ApprovalWorkflow::new(registry(&["a", "b"], 1), executor.clone(), sink.clone());
    let payload: Payload = "0xdeadbeef".parse().unwrap();

    wallet
        .submit_transaction(addr("a"), addr("d"), Amount::from_units(3), payload)
        .await
        .unwrap();
    wallet.confirm_transaction(addr("b"), 0).await.unwrap();

    let first = wallet.execute_transaction(addr("a"), 0).await;
    assert!(matches!(
        first,
        Err(ApprovalError::ExecutionFailed {
            index: 0,
            source: ExecutorError::Rejected(_)
        })
    ));
    assert!(wallet.transaction_at(0).await.unwrap().is_executed());

    let second = wallet.execute_transaction(addr("b"), 0).await;
    assert!(matches!(second, Err(ApprovalError::AlreadyExecuted(0))));
    assert_eq!(executor.attempts.load(Ordering::SeqCst), 1);
    assert!(sink.of_kind(EventKind::Executed).is_empty());
}

#[tokio::test]
async fn test_reentrant_execute_is_refused() {
    let executor = Arc::new(ReentrantExecutor {
        wallet: OnceLock::new(),
        attacker: addr("a"),
        index: 0,
        effects: AtomicUsize::new(0),
        reentry: Mutex::new(None),
    });
    let wallet = Arc::new(ApprovalWorkflow::new(
        registry(&["a", "b"], 1),
        executor.clone(),
        Arc::new(MemorySink::new()),
    ));
    assert!(executor.wallet.set(wallet.clone()).is_ok());

    wallet
        .submit_transaction(addr("a"), addr("d"), Amount::from_units(9), Payload::empty())
        .await
        .unwrap();
    wallet.confirm_transaction(addr("a"), 0).await.unwrap();
    wallet.execute_transaction(addr("b"), 0).await.unwrap();

    assert_eq!(executor.effects.load(Ordering::SeqCst), 1);
    assert_eq!(
        executor.reentry.lock().unwrap().clone(),
        Some(Err("ALREADY_EXECUTED".to_string()))
    );
}

#[tokio::test]
async fn test_concurrent_execution_runs_effect_once() {
    let executor = Arc::new(RecordingExecutor::default());
    let labels = ["a", "b", "c", "d", "e"];
    let wallet = Arc::new(ApprovalWorkflow::new(
        registry(&labels, 2),
        executor.clone(),
        Arc::new(MemorySink::new()),
    ));

    wallet
        .submit_transaction(addr("a"), addr("target"), Amount::from_units(7), Payload::empty())
        .await
        .unwrap();
    wallet.confirm_transaction(addr("a"), 0).await.unwrap();
    wallet.confirm_transaction(addr("b"), 0).await.unwrap();

    let mut handles = Vec::new();
    for label in labels {
        let wallet = wallet.clone();
        handles.push(tokio::spawn(async move {
            wallet.execute_transaction(addr(label), 0).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(ApprovalError::AlreadyExecuted(0)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(executor.calls().len(), 1);
}

#[tokio::test]
async fn test_concurrent_confirmations_match_confirmer_set() {
    let labels: Vec<String> = (0..8).map(|i| format!("owner-{i}")).collect();
    let owners: Vec<Address> = labels.iter().map(|l| addr(l)).collect();
    let wallet = Arc::new(ApprovalWorkflow::with_registry(
        OwnerRegistry::new(owners.clone(), 5).unwrap(),
    ));

    wallet
        .submit_transaction(owners[0], addr("target"), Amount::ZERO, Payload::empty())
        .await
        .unwrap();

    // Every owner confirms twice, concurrently
    let mut handles = Vec::new();
    for owner in owners.iter().chain(owners.iter()).copied() {
        let wallet = wallet.clone();
        handles.push(tokio::spawn(async move {
            wallet.confirm_transaction(owner, 0).await
        }));
    }

    let mut accepted = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(ApprovalError::AlreadyConfirmedByCaller { .. }) => duplicates += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(accepted, owners.len());
    assert_eq!(duplicates, owners.len());

    let tx = wallet.transaction_at(0).await.unwrap();
    assert_eq!(tx.confirmation_count(), owners.len());
    for owner in &owners {
        assert!(wallet.is_confirmed(0, owner).await.unwrap());
    }
}

#[tokio::test]
async fn test_indexes_are_dense_and_stable() {
    let wallet = ApprovalWorkflow::with_registry(registry(&["a", "b"], 2));

    for expected in 0..5u64 {
        let before = wallet.transaction_count().await;
        let index = wallet
            .submit_transaction(
                addr("b"),
                addr("d"),
                Amount::from_units(expected),
                Payload::empty(),
            )
            .await
            .unwrap();
        assert_eq!(index, expected);
        assert_eq!(wallet.transaction_count().await, before + 1);
    }

    let third = wallet.transaction_at(3).await.unwrap();
    assert_eq!(third.value, Amount::from_units(3));
}

#[test]
fn test_invalid_configuration_surfaces_as_approval_error() {
    let config = WalletConfig::new(vec![addr("a"), addr("a")], 1);
    let err: ApprovalError = config.into_registry().unwrap_err().into();

    assert!(matches!(
        err,
        ApprovalError::InvalidConfiguration(ConfigError::DuplicateOwner(_))
    ));
    assert_eq!(err.code(), "INVALID_CONFIGURATION");
}
