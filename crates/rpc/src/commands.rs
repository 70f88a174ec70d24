//! CLI commands

use custody_approval::WalletConfig;
use custody_core::Address;
use std::path::Path;

use crate::context::AppContext;
use crate::scenario::{run_step, Scenario, StepReport};

/// Validate a wallet configuration and print the roster
pub fn check(config_path: &Path) -> Result<(), anyhow::Error> {
    let config = WalletConfig::from_file(config_path)?;
    let registry = config.into_registry()?;

    println!(
        "✅ Valid wallet: {}-of-{}",
        registry.threshold(),
        registry.owner_count()
    );
    for (position, owner) in registry.owners().iter().enumerate() {
        println!("   owner[{}] = {}", position, owner);
    }
    Ok(())
}

/// Print the address derived from a label
pub fn address(label: &str) {
    println!("{} = {}", label, Address::from_label(label));
}

/// Run every step of a scenario, printing outcomes as they happen.
///
/// Step failures do not stop the run. Returns the per-step reports.
pub async fn run(ctx: &AppContext, scenario: &Scenario) -> Vec<StepReport> {
    let mut reports = Vec::with_capacity(scenario.steps.len());

    for (number, step) in scenario.steps.iter().enumerate() {
        let report = run_step(ctx, number + 1, step).await;

        let marker = match (report.succeeded(), report.as_expected) {
            (true, true) => "✅",
            (false, true) => "☑️ ",
            (_, false) => "❌",
        };
        match report.error {
            None => println!("{} [{}] {}", marker, report.number, report.message),
            Some(code) => println!("{} [{}] {} ({})", marker, report.number, report.message, code),
        }

        reports.push(report);
    }

    reports
}

/// Print a closing summary of the wallet and vault
pub async fn summary(ctx: &AppContext) {
    let stats = ctx.wallet.stats().await;
    println!();
    println!(
        "Transactions: {} total, {} pending, {} executed",
        stats.total, stats.pending, stats.executed
    );
    println!("Vault balance: {}", ctx.vault.balance().await);
    println!("Events emitted: {}", ctx.history.len());
    if let Some(path) = ctx.events_path() {
        println!("Event log: {}", path.display());
    }
}
