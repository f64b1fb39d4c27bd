// SPDX-License-Identifier: MIT
//! Static deployment settings, deserialized once from the settings document.
//!
//! Every field that a later stage requires is optional here; the stage that needs it
//! reports a named-field `PlanError::SettingsValidation` when it is absent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SHARD_MAX_BYTES, DEFAULT_SHARD_MAX_ITEMS};
use crate::error::PlanError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub params: ParamSettings,
    /// Per-chain static values, keyed by decimal chain id.
    #[serde(default)]
    pub chain_defaults: BTreeMap<String, ChainDefaults>,
    #[serde(default)]
    pub chains: Vec<ChainPlan>,
    #[serde(default)]
    pub shards: ShardSettings,
}

/// Inputs to the target contract constructor that do not come from prediction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSettings {
    /// Contract whose constructor parameters are assembled and whose address is published.
    pub target_contract: Option<String>,
    /// Contract on the other chain whose predicted address is embedded as an argument.
    pub counterpart_contract: Option<String>,
    pub bridge: Option<String>,
    pub mediator: Option<String>,
    /// Price per token in the smallest unit, as a decimal string.
    pub token_price: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDefaults {
    pub token: Option<String>,
}

/// Ordered deployment steps on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainPlan {
    pub name: String,
    pub chain_id: u64,
    #[serde(default)]
    pub start_nonce: u64,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    pub contract: String,
    /// Overrides the resolved deployer, e.g. a CREATE2 factory.
    pub deployer: Option<String>,
    pub salt: Option<String>,
    pub init_code_hash: Option<String>,
    pub expected_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardSettings {
    pub max_items: Option<usize>,
    pub max_bytes: Option<usize>,
}

/// Resolved shard bounds. Both limits always apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardLimits {
    pub max_items: usize,
    pub max_bytes: usize,
}

impl Default for ShardLimits {
    fn default() -> Self {
        ShardLimits {
            max_items: DEFAULT_SHARD_MAX_ITEMS,
            max_bytes: DEFAULT_SHARD_MAX_BYTES,
        }
    }
}

impl ShardSettings {
    pub fn limits(&self) -> Result<ShardLimits, PlanError> {
        let defaults = ShardLimits::default();
        let limits = ShardLimits {
            max_items: self.max_items.unwrap_or(defaults.max_items),
            max_bytes: self.max_bytes.unwrap_or(defaults.max_bytes),
        };
        if limits.max_items == 0 {
            return Err(PlanError::settings("shards.max_items", "must be at least 1"));
        }
        if limits.max_bytes == 0 {
            return Err(PlanError::settings("shards.max_bytes", "must be at least 1"));
        }
        Ok(limits)
    }
}

impl Settings {
    /// The injected per-chain table, with keys parsed to numeric chain ids.
    pub fn chain_defaults_table(&self) -> Result<BTreeMap<u64, ChainDefaults>, PlanError> {
        self.chain_defaults
            .iter()
            .map(|(key, defaults)| {
                key.trim()
                    .parse::<u64>()
                    .map(|id| (id, defaults.clone()))
                    .map_err(|_| {
                        PlanError::settings(
                            format!("chain_defaults.{key}"),
                            "key must be a decimal chain id",
                        )
                    })
            })
            .collect()
    }

    /// Operator expectations keyed by contract name.
    pub fn expected_addresses(&self) -> BTreeMap<String, String> {
        self.chains
            .iter()
            .flat_map(|chain| chain.steps.iter())
            .filter_map(|step| {
                step.expected_address
                    .as_ref()
                    .map(|addr| (step.contract.clone(), addr.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shard_limits_default() {
        let limits = ShardSettings::default().limits().unwrap();
        assert_eq!(limits, ShardLimits::default());
    }

    #[test]
    fn test_shard_limits_reject_zero() {
        let settings = ShardSettings {
            max_items: Some(0),
            max_bytes: None,
        };
        assert!(settings.limits().is_err());
    }

    #[test]
    fn test_chain_defaults_table_parses_keys() {
        let mut settings = Settings::default();
        settings.chain_defaults.insert(
            "100".to_string(),
            ChainDefaults {
                token: Some("0x01".to_string()),
            },
        );
        let table = settings.chain_defaults_table().unwrap();
        assert!(table.contains_key(&100));

        settings
            .chain_defaults
            .insert("xdai".to_string(), ChainDefaults::default());
        assert!(settings.chain_defaults_table().is_err());
    }

    #[test]
    fn test_expected_addresses_collects_steps() {
        let settings = Settings {
            chains: vec![ChainPlan {
                name: "home".to_string(),
                chain_id: 100,
                start_nonce: 0,
                steps: vec![
                    StepSpec {
                        contract: "mediator".to_string(),
                        expected_address: Some("0xabc".to_string()),
                        ..Default::default()
                    },
                    StepSpec {
                        contract: "distributor".to_string(),
                        ..Default::default()
                    },
                ],
            }],
            ..Default::default()
        };
        let expected = settings.expected_addresses();
        assert_eq!(expected.len(), 1);
        assert_eq!(expected["mediator"], "0xabc");
    }
}
