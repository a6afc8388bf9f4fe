// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line shell over the local archive.
//!
//! Only the read paths live here: listing, search, status, and credential
//! inspection. Synchronization is driven by whatever host embeds
//! `recall-sync` together with a remote client implementation.

mod creds;
mod list;
mod search;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use recall_config::RecallConfig;
use recall_core::RecallError;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recall", version, about = "Searchable local archive of remote bot conversations")]
struct Cli {
    /// Path to an explicit config file (defaults to the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List archived conversations, newest activity first.
    List(list::ListArgs),
    /// Full-text search over archived message content.
    Search(search::SearchArgs),
    /// Show archive row counts per bot.
    Status,
    /// Show credential freshness.
    Creds,
}

fn load_config(cli: &Cli) -> Result<RecallConfig, RecallError> {
    let result = match &cli.config {
        Some(path) => recall_config::load_config_from_path(path),
        None => recall_config::load_config(),
    };
    result.map_err(|e| RecallError::Config(e.to_string()))
}

fn init_tracing(config: &RecallConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run() -> Result<(), RecallError> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config);

    match cli.command {
        Command::List(args) => list::run(&config, args).await,
        Command::Search(args) => search::run(&config, args).await,
        Command::Status => status::run(&config).await,
        Command::Creds => creds::run(&config),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
