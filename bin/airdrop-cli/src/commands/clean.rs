// SPDX-License-Identifier: MIT
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use host_utils::artifacts::clean_artifacts;

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Output directory to clean.
    #[arg(long, default_value = "out")]
    pub out: PathBuf,
}

pub async fn run(args: CleanArgs, json_output: bool) -> Result<()> {
    if !args.out.exists() {
        info!("No output directory found at {}", args.out.display());
        return Ok(());
    }

    let removed = clean_artifacts(&args.out)
        .with_context(|| format!("failed to clean {}", args.out.display()))?;
    info!(
        files = removed.len(),
        "Removed generated artifacts from {}",
        args.out.display()
    );

    if json_output {
        let files: Vec<String> = removed.iter().map(|p| p.display().to_string()).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "removed": files }))?
        );
    }
    Ok(())
}
