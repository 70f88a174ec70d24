//! Custody CLI - Main entry point

use clap::{Parser, Subcommand};
use custody_rpc::{commands, AppContext, Scenario};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "custody")]
#[command(about = "Custody - Quorum-approved shared wallet", long_about = None)]
struct Cli {
    /// Wallet configuration (owners and threshold)
    #[arg(short, long, default_value = "./wallet.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the wallet configuration
    Check,

    /// Run a scenario against a fresh wallet
    Run {
        /// Scenario file (JSON)
        scenario: PathBuf,
        /// Append emitted events to this JSONL file
        #[arg(long)]
        events: Option<PathBuf>,
    },

    /// Print the address derived from a label
    Address {
        /// Label, e.g. "alice"
        label: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            commands::check(&cli.config)?;
        }

        Commands::Run { scenario, events } => {
            let ctx = AppContext::from_config_file(&cli.config, events.as_deref())?;
            let scenario = Scenario::from_file(&scenario)?;

            let reports = commands::run(&ctx, &scenario).await;
            commands::summary(&ctx).await;

            let mismatches = reports.iter().filter(|r| !r.as_expected).count();
            if mismatches > 0 {
                anyhow::bail!("{} step(s) did not go as expected", mismatches);
            }
        }

        Commands::Address { label } => {
            commands::address(&label);
        }
    }

    Ok(())
}
