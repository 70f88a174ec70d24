//! Owner registry - the immutable roster and quorum threshold

use crate::error::ConfigError;
use custody_core::Address;
use std::collections::HashSet;

/// Owners allowed to act on the wallet, and how many must confirm.
///
/// # Invariants
/// - at least one owner, none null, no duplicates
/// - `1 <= threshold <= owners.len()`
///
/// There is no way to change either after construction; a different roster
/// means a different wallet.
#[derive(Debug, Clone)]
pub struct OwnerRegistry {
    owners: Vec<Address>,
    lookup: HashSet<Address>,
    threshold: usize,
}

impl OwnerRegistry {
    /// Validate `owners` and `threshold` and build the registry
    pub fn new(owners: Vec<Address>, threshold: usize) -> Result<Self, ConfigError> {
        if owners.is_empty() {
            return Err(ConfigError::EmptyOwners);
        }
        if threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        if threshold > owners.len() {
            return Err(ConfigError::ThresholdTooHigh {
                threshold,
                owners: owners.len(),
            });
        }

        let mut lookup = HashSet::with_capacity(owners.len());
        for (position, owner) in owners.iter().enumerate() {
            if owner.is_zero() {
                return Err(ConfigError::NullOwner(position));
            }
            if !lookup.insert(*owner) {
                return Err(ConfigError::DuplicateOwner(*owner));
            }
        }

        Ok(Self {
            owners,
            lookup,
            threshold,
        })
    }

    pub fn is_owner(&self, identity: &Address) -> bool {
        self.lookup.contains(identity)
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Owners in the order they were configured
    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    /// Confirmations required before execution
    pub fn threshold(&self) -> usize {
        self.threshold
    }
}
