// SPDX-License-Identifier: MIT
mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "airdrop-plan",
    version,
    about = "Commit token claims and precompute a cross-chain deployment"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output results as JSON.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the claim commitment, predict addresses and write deployment artifacts.
    Prepare(commands::prepare::PrepareArgs),

    /// Check claim proofs in a written artifact set against its root.
    Verify(commands::verify::VerifyArgs),

    /// Remove generated artifacts from an output directory.
    Clean(commands::clean::CleanArgs),
}

impl Commands {
    fn out_dir(&self) -> PathBuf {
        match self {
            Commands::Prepare(args) => args.out.clone(),
            Commands::Verify(args) => args.out.clone(),
            Commands::Clean(args) => args.out.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Sweeping waits for an in-progress write to install or roll back before exiting.
    let out_dir = cli.command.out_dir();
    ctrlc::set_handler(move || {
        tracing::warn!("Interrupted. Cleaning up...");
        let removed = host_utils::artifacts::remove_staging_dirs(&out_dir);
        if removed > 0 {
            tracing::info!(removed, "Removed staging directories");
        }
        std::process::exit(130);
    })
    .ok();

    match cli.command {
        Commands::Prepare(args) => commands::prepare::run(args, cli.json).await,
        Commands::Verify(args) => commands::verify::run(args, cli.json).await,
        Commands::Clean(args) => commands::clean::run(args, cli.json).await,
    }
}
