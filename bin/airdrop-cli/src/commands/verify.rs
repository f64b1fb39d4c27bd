// SPDX-License-Identifier: MIT
use std::path::{Path, PathBuf};

use alloy_primitives::{Address, B256};
use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::{info, warn};

use airdrop_types::claim::ClaimType;
use airdrop_types::constants::{CLAIMS_FILE, ROOT_FILE};
use airdrop_types::conversions::parse_identity;
use airdrop_types::types::ClaimProofEntry;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Directory holding a written artifact set.
    #[arg(long, default_value = "out")]
    pub out: PathBuf,

    /// Beneficiary whose claims should be checked.
    #[arg(long, conflicts_with = "all")]
    pub address: Option<String>,

    /// Only check the beneficiary's claim of this type.
    #[arg(long = "type", requires = "address")]
    pub claim_type: Option<String>,

    /// Check every entry in the claims file.
    #[arg(long)]
    pub all: bool,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("failed to parse {}", path.display()))
}

/// Entries belonging to `address`, optionally narrowed to one claim type.
fn select<'a>(
    entries: &'a [ClaimProofEntry],
    address: Address,
    claim_type: Option<ClaimType>,
) -> Vec<&'a ClaimProofEntry> {
    entries
        .iter()
        .filter(|e| e.claim.address == address)
        .filter(|e| claim_type.map_or(true, |t| e.claim.claim_type == t))
        .collect()
}

pub async fn run(args: VerifyArgs, json_output: bool) -> Result<()> {
    let root: B256 = read_json(&args.out.join(ROOT_FILE))?;
    let entries: Vec<ClaimProofEntry> = read_json(&args.out.join(CLAIMS_FILE))?;
    info!(%root, entries = entries.len(), "Loaded artifact set");

    let selected: Vec<&ClaimProofEntry> = if args.all {
        entries.iter().collect()
    } else {
        let Some(raw) = args.address.as_deref() else {
            bail!("pass --address <0x...> or --all");
        };
        let address = parse_identity(raw).map_err(|e| anyhow::anyhow!("invalid --address: {e}"))?;
        let claim_type = args
            .claim_type
            .as_deref()
            .map(str::parse::<ClaimType>)
            .transpose()
            .map_err(|e| anyhow::anyhow!("invalid --type: {e}"))?;
        let selected = select(&entries, address, claim_type);
        if selected.is_empty() {
            bail!("no claim for {address} in {}", args.out.display());
        }
        selected
    };

    let mut failed = Vec::new();
    for entry in &selected {
        if entry.verify(root) {
            info!(
                index = entry.index,
                address = %entry.claim.address,
                claim_type = %entry.claim.claim_type,
                amount = %entry.claim.amount,
                "Proof valid"
            );
        } else {
            warn!(index = entry.index, address = %entry.claim.address, "Proof does not reach root");
            failed.push(entry.index);
        }
    }

    if json_output {
        let result = serde_json::json!({
            "root": root,
            "checked": selected.len(),
            "valid": selected.len() - failed.len(),
            "invalid_indices": failed,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    if !failed.is_empty() {
        bail!(
            "{} of {} proofs failed verification against root {root}",
            failed.len(),
            selected.len()
        );
    }
    Ok(())
}
