// SPDX-License-Identifier: MIT
//! Address predictor: pure derivation of contract addresses from deploy steps.
//!
//! `CREATE` addresses depend on the deployer nonce, which is chain state, so they are
//! predicted per chain from that chain's `start_nonce`. `CREATE2` addresses depend
//! only on deployer, salt and init code hash and agree across chains.

use std::collections::BTreeSet;

use alloy_primitives::Address;
use tracing::debug;

use airdrop_types::conversions::{parse_b256, parse_identity};
use airdrop_types::error::PlanError;
use airdrop_types::settings::ChainPlan;
use airdrop_types::types::{AddressScheme, DeploySequence, DeployStep, PredictedAddress};

/// Address produced by `deployer` under `scheme`.
pub fn predict_address(deployer: Address, scheme: &AddressScheme) -> Address {
    match scheme {
        AddressScheme::Create { nonce } => deployer.create(*nonce),
        AddressScheme::Create2 {
            salt,
            init_code_hash,
        } => deployer.create2(*salt, *init_code_hash),
    }
}

/// Derivation scheme of one step. Without a salt, the nonce is `start_nonce + position`.
pub fn resolve_scheme(step: &DeployStep, start_nonce: u64) -> Result<AddressScheme, PlanError> {
    match (step.salt, step.init_code_hash) {
        (Some(salt), Some(init_code_hash)) => Ok(AddressScheme::Create2 {
            salt,
            init_code_hash,
        }),
        (None, None) => {
            let nonce = u64::try_from(step.position)
                .ok()
                .and_then(|position| start_nonce.checked_add(position))
                .ok_or_else(|| {
                    PlanError::deploy_plan(format!(
                        "nonce overflow at step {} ({})",
                        step.position, step.contract
                    ))
                })?;
            Ok(AddressScheme::Create { nonce })
        }
        (Some(_), None) => Err(PlanError::deploy_plan(format!(
            "step {} ({}) has a salt but no init_code_hash",
            step.position, step.contract
        ))),
        (None, Some(_)) => Err(PlanError::deploy_plan(format!(
            "step {} ({}) has an init_code_hash but no salt",
            step.position, step.contract
        ))),
    }
}

/// Predict every step of one chain's sequence, in order.
pub fn predict_sequence(sequence: &DeploySequence) -> Result<Vec<PredictedAddress>, PlanError> {
    if sequence.steps.is_empty() {
        return Err(PlanError::deploy_plan(format!(
            "chain '{}' has no deploy steps",
            sequence.chain
        )));
    }

    sequence
        .steps
        .iter()
        .enumerate()
        .map(|(step_index, step)| -> Result<PredictedAddress, PlanError> {
            if step.deployer == Address::ZERO {
                return Err(PlanError::deploy_plan(format!(
                    "step {step_index} ({}) on chain '{}' has an empty deployer identity",
                    step.contract, sequence.chain
                )));
            }
            let scheme = resolve_scheme(step, sequence.start_nonce)?;
            let address = predict_address(step.deployer, &scheme);
            debug!(
                chain = %sequence.chain,
                contract = %step.contract,
                scheme = scheme.name(),
                %address,
                "Predicted address"
            );
            Ok(PredictedAddress {
                contract: step.contract.clone(),
                chain: sequence.chain.clone(),
                chain_id: sequence.chain_id,
                step_index,
                deployer: step.deployer,
                scheme,
                address,
            })
        })
        .collect()
}

/// Predict all sequences. Contract names must be unique across the whole plan.
pub fn predict_all(sequences: &[DeploySequence]) -> Result<Vec<PredictedAddress>, PlanError> {
    if sequences.is_empty() {
        return Err(PlanError::deploy_plan("no chains to deploy to"));
    }

    let mut names = BTreeSet::new();
    let mut predicted = Vec::new();
    for sequence in sequences {
        for step in &sequence.steps {
            if !names.insert(step.contract.as_str()) {
                return Err(PlanError::deploy_plan(format!(
                    "contract name '{}' appears more than once",
                    step.contract
                )));
            }
        }
        predicted.extend(predict_sequence(sequence)?);
    }
    Ok(predicted)
}

/// Turn settings chain plans into deploy sequences for `deployer`.
pub fn build_sequences(
    chains: &[ChainPlan],
    deployer: Address,
) -> Result<Vec<DeploySequence>, PlanError> {
    chains
        .iter()
        .enumerate()
        .map(|(chain_index, chain)| -> Result<DeploySequence, PlanError> {
            let steps = chain
                .steps
                .iter()
                .enumerate()
                .map(|(position, planned)| -> Result<DeployStep, PlanError> {
                    let field = |name: &str| format!("chains[{chain_index}].steps[{position}].{name}");
                    let step_deployer = planned
                        .deployer
                        .as_deref()
                        .map(parse_identity)
                        .transpose()
                        .map_err(|reason| PlanError::settings(field("deployer"), reason))?
                        .unwrap_or(deployer);
                    let salt = planned
                        .salt
                        .as_deref()
                        .map(parse_b256)
                        .transpose()
                        .map_err(|reason| PlanError::settings(field("salt"), reason))?;
                    let init_code_hash = planned
                        .init_code_hash
                        .as_deref()
                        .map(parse_b256)
                        .transpose()
                        .map_err(|reason| PlanError::settings(field("init_code_hash"), reason))?;
                    // A factory's nonce is not the chain plan's start_nonce.
                    if planned.deployer.is_some() && (salt.is_none() || init_code_hash.is_none()) {
                        return Err(PlanError::settings(
                            field("deployer"),
                            "a deployer override requires salt and init_code_hash",
                        ));
                    }
                    Ok(DeployStep {
                        contract: planned.contract.clone(),
                        deployer: step_deployer,
                        position,
                        salt,
                        init_code_hash,
                    })
                })
                .collect::<Result<Vec<_>, PlanError>>()?;

            Ok(DeploySequence {
                chain: chain.name.clone(),
                chain_id: chain.chain_id,
                start_nonce: chain.start_nonce,
                steps,
            })
        })
        .collect()
}
