// SPDX-License-Identifier: MIT
//! Pipeline orchestration.
//!
//! Runs every stage in order and returns a [`PreparedRun`] only when all of them
//! succeeded. Nothing here touches the output location; writing is a separate
//! step over a verified run.

use std::path::PathBuf;

use alloy_primitives::Address;
use anyhow::{Context, Result};
use tracing::info;

use airdrop_logic::merkle::{commit, Commitment};
use airdrop_logic::params::assemble;
use airdrop_logic::predictor::{build_sequences, predict_all};
use airdrop_logic::verifier::{check_network, verify_addresses, VerificationReport};
use airdrop_types::settings::ShardLimits;
use airdrop_types::types::{DeploymentParameters, PredictedAddress};

use crate::inputs::{load_claims, load_settings};
use crate::provider::NetworkProvider;

/// Everything a run reads from outside the network.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub claims_path: PathBuf,
    pub settings_path: PathBuf,
    /// The single chain id this deployment is allowed to run against.
    pub expected_chain_id: u64,
    pub max_shard_items: Option<usize>,
    pub max_shard_bytes: Option<usize>,
}

/// A fully verified run, ready to be rendered.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub chain_id: u64,
    pub deployer: Address,
    pub commitment: Commitment,
    pub predicted: Vec<PredictedAddress>,
    pub report: VerificationReport,
    pub parameters: DeploymentParameters,
    pub shard_limits: ShardLimits,
}

/// Run every stage up to (not including) writing artifacts.
///
/// The network is checked before any input file is opened.
pub async fn prepare<N: NetworkProvider>(network: &N, inputs: &PipelineInputs) -> Result<PreparedRun> {
    let chain_id = network
        .resolve_network()
        .await
        .context("failed to resolve network identity")?;
    check_network(inputs.expected_chain_id, chain_id)?;
    let deployer = network
        .resolve_deployer()
        .await
        .context("failed to resolve deployer")?;
    info!(chain_id, %deployer, "Network resolved");

    let claims = load_claims(&inputs.claims_path)?;
    let settings = load_settings(&inputs.settings_path)?;

    let commitment = commit(&claims)?;
    info!(
        root = %commitment.root,
        depth = commitment.depth,
        leaves = commitment.entries.len(),
        "Commitment built"
    );

    let sequences = build_sequences(&settings.chains, deployer)?;
    let predicted = predict_all(&sequences)?;
    info!(contracts = predicted.len(), "Addresses predicted");

    let report = verify_addresses(&predicted, &settings.expected_addresses())?;

    let chain_defaults = settings.chain_defaults_table()?;
    let parameters = assemble(commitment.root, &predicted, &settings.params, &chain_defaults)?;
    info!(
        contract = %parameters.contract,
        address = %parameters.address,
        "Deployment parameters assembled"
    );

    let mut shards = settings.shards.clone();
    if inputs.max_shard_items.is_some() {
        shards.max_items = inputs.max_shard_items;
    }
    if inputs.max_shard_bytes.is_some() {
        shards.max_bytes = inputs.max_shard_bytes;
    }
    let shard_limits = shards.limits()?;

    Ok(PreparedRun {
        chain_id,
        deployer,
        commitment,
        predicted,
        report,
        parameters,
        shard_limits,
    })
}
