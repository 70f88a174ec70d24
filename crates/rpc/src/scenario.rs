//! Scripted scenarios
//!
//! A scenario is a JSON document listing wallet operations in order:
//!
//! ```json
//! {
//!   "steps": [
//!     { "op": "deposit", "from": "carol", "amount": "10" },
//!     { "op": "submit", "caller": "alice", "target": "dave", "value": "5" },
//!     { "op": "confirm", "caller": "bob", "index": 0 },
//!     { "op": "execute", "caller": "carol", "index": 0 },
//!     { "op": "execute", "caller": "bob", "index": 0, "expect": "ALREADY_EXECUTED" }
//!   ]
//! }
//! ```
//!
//! Parties are either `0x` addresses or labels, which resolve through
//! `Address::from_label`. A step may state the error code it expects; the
//! run reports every step whose outcome differs from its expectation.

use custody_approval::{ApprovalError, ExecutorError};
use custody_core::{Address, AddressError, Amount, Payload};
use custody_ledger::{Transaction, TransactionStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::context::AppContext;

/// Why a step failed
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Approval(#[from] ApprovalError),

    #[error("Vault error: {0}")]
    Vault(#[from] ExecutorError),

    #[error("Invalid party '{party}': {source}")]
    InvalidParty {
        party: String,
        #[source]
        source: AddressError,
    },
}

impl StepError {
    pub fn code(&self) -> &'static str {
        match self {
            StepError::Approval(e) => e.code(),
            StepError::Vault(_) => "VAULT_ERROR",
            StepError::InvalidParty { .. } => "INVALID_PARTY",
        }
    }
}

/// A participant named by address or by label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Party(pub String);

impl Party {
    /// `0x`-prefixed names must be valid addresses; anything else that is
    /// not bare hex is treated as a label.
    pub fn resolve(&self) -> Result<Address, AddressError> {
        if self.0.starts_with("0x") || self.0.starts_with("0X") {
            return self.0.parse();
        }
        Ok(self
            .0
            .parse()
            .unwrap_or_else(|_| Address::from_label(&self.0)))
    }

    fn address(&self) -> Result<Address, StepError> {
        self.resolve().map_err(|source| StepError::InvalidParty {
            party: self.0.clone(),
            source,
        })
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One scripted operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Deposit {
        from: Party,
        amount: Amount,
    },
    Submit {
        caller: Party,
        target: Party,
        value: Amount,
        #[serde(default)]
        payload: Payload,
        #[serde(default)]
        expect: Option<String>,
    },
    Confirm {
        caller: Party,
        index: u64,
        #[serde(default)]
        expect: Option<String>,
    },
    Execute {
        caller: Party,
        index: u64,
        #[serde(default)]
        expect: Option<String>,
    },
    Show {
        index: u64,
    },
    List {
        #[serde(default)]
        status: Option<TransactionStatus>,
    },
}

impl Step {
    fn expected(&self) -> Option<&str> {
        match self {
            Step::Submit { expect, .. }
            | Step::Confirm { expect, .. }
            | Step::Execute { expect, .. } => expect.as_deref(),
            Step::Deposit { .. } | Step::Show { .. } | Step::List { .. } => None,
        }
    }
}

/// An ordered list of steps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// What happened when a step ran
#[derive(Debug, Clone)]
pub struct StepReport {
    pub number: usize,
    /// Human-readable outcome line
    pub message: String,
    /// Error code, if the step failed
    pub error: Option<&'static str>,
    /// Whether the outcome matched the step's expectation
    pub as_expected: bool,
}

impl StepReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Run one step against the context
pub async fn run_step(ctx: &AppContext, number: usize, step: &Step) -> StepReport {
    let outcome = apply(ctx, step).await;
    let expected = step.expected();

    let (message, error) = match outcome {
        Ok(message) => (message, None),
        Err(e) => (e.to_string(), Some(e.code())),
    };
    let as_expected = error == expected;

    if !as_expected {
        tracing::warn!(
            step = number,
            ?expected,
            actual = ?error,
            "Step outcome differs from expectation"
        );
    }

    StepReport {
        number,
        message,
        error,
        as_expected,
    }
}

async fn apply(ctx: &AppContext, step: &Step) -> Result<String, StepError> {
    let wallet = &ctx.wallet;

    match step {
        Step::Deposit { from, amount } => {
            let balance = ctx.deposit(from.address()?, *amount).await?;
            Ok(format!("deposit {} from {} (vault balance {})", amount, from, balance))
        }

        Step::Submit {
            caller,
            target,
            value,
            payload,
            ..
        } => {
            let index = wallet
                .submit_transaction(caller.address()?, target.address()?, *value, payload.clone())
                .await?;
            Ok(format!("{} submitted #{}: {} to {}", caller, index, value, target))
        }

        Step::Confirm { caller, index, .. } => {
            let confirmation = wallet.confirm_transaction(caller.address()?, *index).await?;
            Ok(format!(
                "{} confirmed #{} ({}/{}{})",
                caller,
                index,
                confirmation.transaction.confirmation_count(),
                wallet.threshold(),
                if confirmation.quorum_reached { ", quorum reached" } else { "" }
            ))
        }

        Step::Execute { caller, index, .. } => {
            let tx = wallet.execute_transaction(caller.address()?, *index).await?;
            Ok(format!("{} executed #{}: {} sent to {}", caller, index, tx.value, tx.target))
        }

        Step::Show { index } => Ok(describe(&wallet.transaction_at(*index).await?)),

        Step::List { status } => {
            let transactions = wallet.list(*status).await;
            let mut lines = vec![format!("{} transaction(s)", transactions.len())];
            lines.extend(transactions.iter().map(describe));
            Ok(lines.join("\n   "))
        }
    }
}

/// One-line summary of a transaction
pub fn describe(tx: &Transaction) -> String {
    format!(
        "#{} [{}] {} -> {} payload={} confirmations={}",
        tx.index,
        tx.status(),
        tx.value,
        tx.target.short(),
        tx.payload,
        tx.confirmation_count()
    )
}
