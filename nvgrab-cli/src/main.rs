//! nvgrab CLI
//!
//! Hardware-accelerated screen recording via NVENC.
//!
//! # Usage
//!
//! ```bash
//! # Record the screen to a file
//! nvgrab record -o capture.mp4
//!
//! # Show encoder and backend availability
//! nvgrab info
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// nvgrab - NVENC screen recorder
#[derive(Parser)]
#[command(name = "nvgrab")]
#[command(version)]
#[command(about = "Hardware-accelerated screen recording via NVENC", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record the screen to a container file
    #[command(alias = "rec")]
    Record(commands::RecordArgs),

    /// Show encoder and capture backend availability
    Info,

    /// Print a sample configuration file
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("nvgrab={}", level).parse().unwrap()),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Record(args) => commands::record(args).await?,
        Commands::Info => commands::info().await?,
        Commands::Config => commands::config().await?,
    }

    Ok(())
}
