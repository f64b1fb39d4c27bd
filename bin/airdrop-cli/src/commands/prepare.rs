// SPDX-License-Identifier: MIT
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use airdrop_types::constants::parse_shard_file_name;
use host_utils::artifacts::{render_artifacts, write_artifacts};
use host_utils::pipeline::{self, PipelineInputs, PreparedRun};
use host_utils::provider::{RpcNetwork, StaticNetwork};

use crate::config;
use crate::progress;

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Claims table (CSV with address, amount and type columns).
    #[arg(long)]
    pub claims: PathBuf,

    /// Deployment settings (TOML).
    #[arg(long)]
    pub settings: PathBuf,

    /// Output directory for the generated artifacts.
    #[arg(long, default_value = "out")]
    pub out: PathBuf,

    /// Ethereum JSON-RPC endpoint URL.
    #[arg(long, default_value = "")]
    pub rpc_url: String,

    /// The only chain id this deployment may run against.
    #[arg(long)]
    pub chain_id: Option<u64>,

    /// Deployer address. Defaults to the node's first account.
    #[arg(long)]
    pub deployer: Option<String>,

    /// Skip the RPC and trust --chain-id and --deployer.
    #[arg(long)]
    pub offline: bool,

    /// Run every stage but write nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Maximum entries per claims shard.
    #[arg(long)]
    pub max_shard_items: Option<usize>,

    /// Maximum serialized bytes per claims shard.
    #[arg(long)]
    pub max_shard_bytes: Option<usize>,
}

pub async fn run(args: PrepareArgs, json_output: bool) -> Result<()> {
    let expected_chain_id = config::resolve_chain_id(args.chain_id)?;
    let deployer = config::resolve_deployer(args.deployer.as_deref())?;

    let inputs = PipelineInputs {
        claims_path: args.claims.clone(),
        settings_path: args.settings.clone(),
        expected_chain_id,
        max_shard_items: args.max_shard_items,
        max_shard_bytes: args.max_shard_bytes,
    };

    let sp = progress::spinner("Preparing deployment...");
    let prepared = if args.offline {
        let deployer = deployer.context("--offline requires a deployer (--deployer or AIRDROP_PLAN_DEPLOYER)")?;
        let network = StaticNetwork {
            chain_id: expected_chain_id,
            deployer,
        };
        pipeline::prepare(&network, &inputs).await
    } else {
        let rpc_url = config::resolve_rpc_url(&args.rpc_url)?;
        let network = RpcNetwork::connect(&rpc_url, deployer)?;
        pipeline::prepare(&network, &inputs).await
    };
    let run = match prepared {
        Ok(run) => run,
        Err(e) => {
            progress::fail(&sp, "Preparation aborted");
            return Err(e);
        }
    };
    progress::finish(
        &sp,
        &format!(
            "Committed {} claims, predicted {} addresses",
            run.commitment.entries.len(),
            run.predicted.len()
        ),
    );

    let artifacts = render_artifacts(&run).context("failed to render artifacts")?;
    let shards = artifacts
        .iter()
        .filter(|a| parse_shard_file_name(&a.name).is_some())
        .count();

    if args.dry_run {
        info!(files = artifacts.len(), "Dry run complete. Nothing written.");
    } else {
        let sp = progress::spinner("Writing artifacts...");
        match write_artifacts(&args.out, &artifacts) {
            Ok(summary) => progress::finish(
                &sp,
                &format!(
                    "Wrote {} files to {}",
                    summary.installed.len(),
                    args.out.display()
                ),
            ),
            Err(e) => {
                progress::fail(&sp, "Write failed; previous artifacts left in place");
                return Err(e);
            }
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary_json(&run, &args, shards))?);
    }

    Ok(())
}

fn summary_json(run: &PreparedRun, args: &PrepareArgs, shards: usize) -> serde_json::Value {
    let predicted: Vec<serde_json::Value> = run
        .predicted
        .iter()
        .map(|p| {
            serde_json::json!({
                "contract": p.contract,
                "chain": p.chain,
                "chain_id": p.chain_id,
                "scheme": p.scheme.name(),
                "address": p.address.to_checksum(None),
            })
        })
        .collect();
    serde_json::json!({
        "chain_id": run.chain_id,
        "deployer": run.deployer.to_checksum(None),
        "merkle_root": run.commitment.root,
        "claims": run.commitment.entries.len(),
        "tree_depth": run.commitment.depth,
        "target": run.parameters.contract,
        "target_address": run.parameters.address.to_checksum(None),
        "predicted": predicted,
        "unverified": run.report.unverified,
        "shards": shards,
        "out": args.out.display().to_string(),
        "dry_run": args.dry_run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use std::collections::BTreeMap;
    use std::path::Path;

    const DEPLOYER: Address = Address::new([0x42; 20]);

    fn claims_csv(count: u8) -> String {
        let mut csv = String::from("address,amount,type\n");
        for i in 1..=count {
            csv.push_str(&format!("{:#x},{},airdrop\n", Address::new([i; 20]), 100 * i as u64));
        }
        csv
    }

    fn settings_toml(distributor_expected: Address) -> String {
        format!(
            r#"
[params]
target_contract = "distributor"
counterpart_contract = "mediator"
bridge = "0x3333333333333333333333333333333333333333"
mediator = "0x4444444444444444444444444444444444444444"
token_price = "1000"

[chain_defaults."100"]
token = "0x5555555555555555555555555555555555555555"

[[chains]]
name = "home"
chain_id = 100

[[chains.steps]]
contract = "distributor"
expected_address = "{distributor_expected}"

[[chains.steps]]
contract = "mediator"
"#
        )
    }

    fn offline_args(dir: &Path, max_shard_items: Option<usize>) -> PrepareArgs {
        PrepareArgs {
            claims: dir.join("claims.csv"),
            settings: dir.join("settings.toml"),
            out: dir.join("out"),
            rpc_url: String::new(),
            chain_id: Some(100),
            deployer: Some(format!("{DEPLOYER:#x}")),
            offline: true,
            dry_run: false,
            max_shard_items,
            max_shard_bytes: None,
        }
    }

    fn snapshot(out: &Path) -> BTreeMap<String, Vec<u8>> {
        std::fs::read_dir(out)
            .unwrap()
            .map(|e| {
                let e = e.unwrap();
                (
                    e.file_name().to_string_lossy().into_owned(),
                    std::fs::read(e.path()).unwrap(),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_mismatch_leaves_previous_artifacts_untouched() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("claims.csv"), claims_csv(3)).unwrap();
        std::fs::write(dir.path().join("settings.toml"), settings_toml(DEPLOYER.create(0))).unwrap();
        run(offline_args(dir.path(), Some(1)), false).await.unwrap();
        let before = snapshot(&dir.path().join("out"));
        assert!(before.contains_key("claims-2.json"));

        // Different claims and a wrong expectation: nothing may change on disk.
        std::fs::write(dir.path().join("claims.csv"), claims_csv(1)).unwrap();
        std::fs::write(
            dir.path().join("settings.toml"),
            settings_toml(Address::new([0x99; 20])),
        )
        .unwrap();
        assert!(run(offline_args(dir.path(), Some(1)), false).await.is_err());
        assert_eq!(snapshot(&dir.path().join("out")), before);
    }

    #[tokio::test]
    async fn test_rerun_with_fewer_claims_leaves_no_orphan_shards() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.toml"), settings_toml(DEPLOYER.create(0))).unwrap();

        std::fs::write(dir.path().join("claims.csv"), claims_csv(3)).unwrap();
        run(offline_args(dir.path(), Some(1)), false).await.unwrap();
        let shards = |out: &Path| -> Vec<String> {
            snapshot(out)
                .into_keys()
                .filter(|name| parse_shard_file_name(name).is_some())
                .collect()
        };
        assert_eq!(
            shards(&dir.path().join("out")),
            vec!["claims-0.json", "claims-1.json", "claims-2.json"]
        );

        std::fs::write(dir.path().join("claims.csv"), claims_csv(1)).unwrap();
        run(offline_args(dir.path(), Some(1)), false).await.unwrap();
        assert_eq!(shards(&dir.path().join("out")), vec!["claims-0.json"]);
        assert_eq!(
            snapshot(&dir.path().join("out")).into_keys().collect::<Vec<_>>(),
            vec!["address.json", "claims-0.json", "claims.json", "parameters.json", "root.json"]
        );
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("claims.csv"), claims_csv(2)).unwrap();
        std::fs::write(dir.path().join("settings.toml"), settings_toml(DEPLOYER.create(0))).unwrap();
        let mut args = offline_args(dir.path(), None);
        args.dry_run = true;
        run(args, false).await.unwrap();
        assert!(!dir.path().join("out").exists());
    }
}
