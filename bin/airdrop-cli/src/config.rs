// SPDX-License-Identifier: MIT
use alloy_primitives::Address;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use airdrop_types::conversions::parse_identity;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub rpc_url: Option<String>,
    pub chain_id: Option<u64>,
    pub deployer: Option<String>,
}

fn config_path() -> Option<PathBuf> {
    dirs_next::home_dir().map(|h| h.join(".airdrop-plan").join("config.toml"))
}

pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    if !path.exists() {
        return Config::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed config file");
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}

/// First non-empty value among the flag, the named env vars (in order) and the config file.
fn first_set(
    flag: Option<&str>,
    env_vars: &[&str],
    lookup: impl Fn(&str) -> Option<String>,
    from_config: Option<String>,
) -> Option<String> {
    if let Some(v) = flag.filter(|v| !v.is_empty()) {
        return Some(v.to_string());
    }
    env_vars
        .iter()
        .filter_map(|name| lookup(name))
        .find(|v| !v.is_empty())
        .or_else(|| from_config.filter(|v| !v.is_empty()))
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolve the RPC URL from CLI flag, environment variable, or config file.
pub fn resolve_rpc_url(cli_flag: &str) -> Result<String> {
    first_set(
        Some(cli_flag),
        &["AIRDROP_PLAN_RPC_URL", "RPC_URL"],
        env,
        load_config().rpc_url,
    )
    .context(
        "No RPC URL provided. Use --rpc-url, AIRDROP_PLAN_RPC_URL/RPC_URL env var, or ~/.airdrop-plan/config.toml",
    )
}

/// Resolve the single chain id this deployment targets.
pub fn resolve_chain_id(cli_flag: Option<u64>) -> Result<u64> {
    if let Some(id) = cli_flag {
        return Ok(id);
    }
    let raw = first_set(
        None,
        &["AIRDROP_PLAN_CHAIN_ID"],
        env,
        load_config().chain_id.map(|id| id.to_string()),
    )
    .context(
        "No expected chain id provided. Use --chain-id, AIRDROP_PLAN_CHAIN_ID env var, or ~/.airdrop-plan/config.toml",
    )?;
    raw.trim()
        .parse()
        .with_context(|| format!("invalid chain id '{raw}'"))
}

/// Resolve an explicit deployer, if any. Without one, the node's account is used.
pub fn resolve_deployer(cli_flag: Option<&str>) -> Result<Option<Address>> {
    first_set(cli_flag, &["AIRDROP_PLAN_DEPLOYER"], env, load_config().deployer)
        .map(|raw| parse_identity(&raw).map_err(|e| anyhow::anyhow!("invalid deployer '{raw}': {e}")))
        .transpose()
}
