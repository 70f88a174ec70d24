//! Custody RPC - CLI orchestrator
//!
//! This crate provides the `custody` binary, the application context that
//! wires a wallet to its executor and event sinks, and the scenario runner
//! used to drive a wallet from a JSON script.

pub mod commands;
pub mod context;
pub mod scenario;
pub mod vault;

pub use context::AppContext;
pub use scenario::{Party, Scenario, Step, StepError, StepReport};
pub use vault::Vault;
