//! Application context - wires everything together

use custody_approval::{ApprovalWorkflow, ExecutorError, WalletConfig};
use custody_core::{Address, Amount};
use custody_events::{BroadcastSink, EventSink, FanoutSink, JsonlSink, MemorySink};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::vault::Vault;

/// Application context - one wallet with its vault and event sinks
pub struct AppContext {
    pub wallet: Arc<ApprovalWorkflow>,
    pub vault: Arc<Vault>,
    /// Every event of this run, in order
    pub history: Arc<MemorySink>,
    pub broadcast: Arc<BroadcastSink>,
    events_path: Option<PathBuf>,
}

impl AppContext {
    /// Build a wallet from `config`, optionally logging events to a JSONL file
    pub fn new(config: WalletConfig, events_path: Option<&Path>) -> Result<Self, anyhow::Error> {
        let registry = config.into_registry()?;

        let vault = Arc::new(Vault::new());
        let history = Arc::new(MemorySink::new());
        let broadcast = Arc::new(BroadcastSink::default());

        let mut sinks = FanoutSink::new()
            .with(history.clone())
            .with(broadcast.clone());

        if let Some(path) = events_path {
            let journal = JsonlSink::open(path)?;
            tracing::info!(path = %journal.path().display(), "Logging events");
            sinks.push(Arc::new(journal));
        }

        let events: Arc<dyn EventSink> = Arc::new(sinks);
        let wallet = Arc::new(ApprovalWorkflow::new(registry, vault.clone(), events));

        Ok(Self {
            wallet,
            vault,
            history,
            broadcast,
            events_path: events_path.map(Path::to_path_buf),
        })
    }

    /// Load the wallet configuration from `config_path` and build a context
    pub fn from_config_file(
        config_path: &Path,
        events_path: Option<&Path>,
    ) -> Result<Self, anyhow::Error> {
        let config = WalletConfig::from_file(config_path)?;
        Self::new(config, events_path)
    }

    /// Fund the vault and announce the deposit
    pub async fn deposit(&self, sender: Address, amount: Amount) -> Result<Amount, ExecutorError> {
        let balance = self.vault.credit(amount).await?;
        self.wallet.receive(sender, amount).await;
        Ok(balance)
    }

    pub fn events_path(&self) -> Option<&Path> {
        self.events_path.as_deref()
    }
}
