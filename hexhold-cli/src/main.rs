//! HEXHOLD CLI - Command-line interface
//!
//! Commands:
//! - play: interactive session in the terminal
//! - autoplay: headless rounds for smoke-testing a level

mod autoplay;
mod play;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hexhold")]
#[command(about = "HEXHOLD turn-based hex territory game")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a level interactively
    Play {
        /// Level JSON file
        #[arg(long, default_value = "levels/skirmish.json")]
        level: PathBuf,
        /// Directory for saved state
        #[arg(long, default_value = "saves")]
        data_dir: PathBuf,
        /// AI seed (same seed, same opponents)
        #[arg(long, default_value = "42")]
        seed: u64,
    },
    /// Run rounds headlessly with the human sitting idle
    Autoplay {
        /// Level JSON file
        #[arg(long, default_value = "levels/skirmish.json")]
        level: PathBuf,
        /// Rounds to play before stopping
        #[arg(long, default_value = "20")]
        rounds: u32,
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play { level, data_dir, seed } => play::run(&level, &data_dir, seed).await,
        Commands::Autoplay { level, rounds, seed } => autoplay::run(&level, rounds, seed).await,
    }
}
