mod commands;
mod config;
mod events;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tourncal")]
#[command(about = "Reconcile tournament calendars against external calendar providers")]
struct Cli {
    /// Path to config.toml (defaults to ~/.config/tourncal/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile canonical events against the remote calendars
    Sync {
        /// Only reconcile this source
        #[arg(short, long)]
        source: Option<String>,

        /// Compute and print pending actions without calling the remote
        #[arg(long)]
        dry_run: bool,
    },
    /// Show pending actions per source without touching the remote
    Status,
    /// Audit persisted mappings against remote truth and purge stale ones
    Repair {
        /// Only audit this source
        #[arg(short, long)]
        source: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Sync { source, dry_run } => {
            commands::sync::run(&cfg, source.as_deref(), dry_run).await
        }
        Commands::Status => commands::status::run(&cfg),
        Commands::Repair { source } => commands::repair::run(&cfg, source.as_deref()).await,
    }
}
