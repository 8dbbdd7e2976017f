//! Playtrace CLI - Headless Telemetry Replay Tool
//!
//! Features:
//! - Replay a scripted lifecycle scenario against a tracker pair
//! - Print every emitted analytics event as JSON
//! - List the recognized lifecycle calls

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

/// Playtrace CLI - playback telemetry replay toolkit
#[derive(Parser)]
#[command(name = "playtrace-cli")]
#[command(version)]
#[command(about = "Replay playback lifecycle scenarios and inspect emitted telemetry", long_about = None)]
struct Cli {
    /// Enable verbose engine logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file
    Replay {
        /// Path to the scenario JSON file
        scenario: PathBuf,

        /// Pretty-print emitted events instead of JSON lines
        #[arg(short, long)]
        pretty: bool,
    },

    /// List the lifecycle calls a scenario may use
    Calls,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Commands::Replay { scenario, pretty } => commands::replay(&scenario, pretty),
        Commands::Calls => {
            commands::list_calls();
            Ok(())
        }
    }
}
