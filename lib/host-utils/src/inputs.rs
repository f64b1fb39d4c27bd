// SPDX-License-Identifier: MIT
//! Reading the claims table and the settings document from disk.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use airdrop_logic::claims::parse_claims;
use airdrop_types::claim::Claim;
use airdrop_types::error::PlanError;
use airdrop_types::settings::Settings;

/// Load and validate the whole claims table. Any malformed row fails the load.
pub fn load_claims(path: &Path) -> Result<Vec<Claim>> {
    let content = std::fs::read_to_string(path).map_err(|e| PlanError::io(path, e))?;
    let claims = parse_claims(&content)?;
    info!(claims = claims.len(), path = %path.display(), "Loaded claims");
    Ok(claims)
}

/// Load the TOML settings document.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path).map_err(|e| PlanError::io(path, e))?;
    let settings: Settings = toml::from_str(&content)
        .map_err(|e| PlanError::settings(path.display().to_string(), e.to_string()))?;
    info!(
        chains = settings.chains.len(),
        path = %path.display(),
        "Loaded settings"
    );
    Ok(settings)
}
