//! Wallet configuration
//!
//! The roster and threshold come from a JSON file so that the same binary
//! can stand up any wallet:
//!
//! ```json
//! { "owners": ["0x…", "0x…", "0x…"], "threshold": 2 }
//! ```

use crate::error::ConfigError;
use crate::registry::OwnerRegistry;
use custody_core::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Owner roster and quorum threshold, as read from disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Owners in roster order
    pub owners: Vec<Address>,

    /// Confirmations required to execute
    #[serde(default = "default_threshold")]
    pub threshold: usize,
}

fn default_threshold() -> usize {
    1
}

impl WalletConfig {
    pub fn new(owners: Vec<Address>, threshold: usize) -> Self {
        Self { owners, threshold }
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Validate into an owner registry
    pub fn into_registry(self) -> Result<OwnerRegistry, ConfigError> {
        OwnerRegistry::new(self.owners, self.threshold)
    }
}
