// SPDX-License-Identifier: MIT
//! Parameter assembler: pure merge of root, predictions and static settings into
//! the target contract's constructor arguments.

use std::collections::BTreeMap;

use alloy_primitives::{Address, B256};

use airdrop_types::conversions::{parse_identity, parse_positive_amount};
use airdrop_types::error::PlanError;
use airdrop_types::settings::{ChainDefaults, ParamSettings};
use airdrop_types::types::{ArgValue, ConstructorArg, DeploymentParameters, PredictedAddress};

pub const ARG_MERKLE_ROOT: &str = "merkleRoot";
pub const ARG_TOKEN: &str = "token";
pub const ARG_BRIDGE: &str = "bridge";
pub const ARG_MEDIATOR: &str = "mediator";
pub const ARG_COUNTERPART: &str = "counterpart";
pub const ARG_TOKEN_PRICE: &str = "tokenPrice";

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, PlanError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PlanError::missing(field))
}

fn required_address(value: &Option<String>, field: &str) -> Result<Address, PlanError> {
    parse_identity(required(value, field)?).map_err(|reason| PlanError::settings(field, reason))
}

fn find_predicted<'a>(
    predicted: &'a [PredictedAddress],
    name: &str,
    field: &str,
) -> Result<&'a PredictedAddress, PlanError> {
    predicted
        .iter()
        .find(|p| p.contract == name)
        .ok_or_else(|| {
            PlanError::settings(field, format!("contract '{name}' is not part of the deploy plan"))
        })
}

fn arg(name: &str, value: ArgValue) -> ConstructorArg {
    ConstructorArg {
        name: name.to_string(),
        value,
    }
}

/// Constructor order: merkleRoot, token, bridge, mediator, counterpart, tokenPrice.
///
/// The token comes from `chain_defaults` for the target contract's chain.
pub fn assemble(
    merkle_root: B256,
    predicted: &[PredictedAddress],
    params: &ParamSettings,
    chain_defaults: &BTreeMap<u64, ChainDefaults>,
) -> Result<DeploymentParameters, PlanError> {
    let target_name = required(&params.target_contract, "params.target_contract")?;
    let target = find_predicted(predicted, target_name, "params.target_contract")?;
    let counterpart_name = required(&params.counterpart_contract, "params.counterpart_contract")?;
    let counterpart = find_predicted(predicted, counterpart_name, "params.counterpart_contract")?;

    let token_field = format!("chain_defaults.{}.token", target.chain_id);
    let token_raw = chain_defaults
        .get(&target.chain_id)
        .and_then(|defaults| defaults.token.clone());
    let token = required_address(&token_raw, &token_field)?;

    let bridge = required_address(&params.bridge, "params.bridge")?;
    let mediator = required_address(&params.mediator, "params.mediator")?;
    let token_price = parse_positive_amount(required(&params.token_price, "params.token_price")?)
        .map_err(|reason| PlanError::settings("params.token_price", reason))?;

    Ok(DeploymentParameters {
        contract: target.contract.clone(),
        chain_id: target.chain_id,
        address: target.address,
        merkle_root,
        args: vec![
            arg(ARG_MERKLE_ROOT, ArgValue::Bytes32(merkle_root)),
            arg(ARG_TOKEN, ArgValue::Address(token)),
            arg(ARG_BRIDGE, ArgValue::Address(bridge)),
            arg(ARG_MEDIATOR, ArgValue::Address(mediator)),
            arg(ARG_COUNTERPART, ArgValue::Address(counterpart.address)),
            arg(ARG_TOKEN_PRICE, ArgValue::Uint256(token_price)),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdrop_types::types::AddressScheme;
    use alloy_primitives::U256;

    fn prediction(contract: &str, chain_id: u64, byte: u8) -> PredictedAddress {
        PredictedAddress {
            contract: contract.to_string(),
            chain: format!("chain-{chain_id}"),
            chain_id,
            step_index: 0,
            deployer: Address::from([0x01u8; 20]),
            scheme: AddressScheme::Create { nonce: 0 },
            address: Address::from([byte; 20]),
        }
    }

    fn params() -> ParamSettings {
        ParamSettings {
            target_contract: Some("distributor".to_string()),
            counterpart_contract: Some("mediator".to_string()),
            bridge: Some("0x3333333333333333333333333333333333333333".to_string()),
            mediator: Some("0x4444444444444444444444444444444444444444".to_string()),
            token_price: Some("250000000000000".to_string()),
        }
    }

    fn defaults() -> BTreeMap<u64, ChainDefaults> {
        let mut table = BTreeMap::new();
        table.insert(
            100,
            ChainDefaults {
                token: Some("0x5555555555555555555555555555555555555555".to_string()),
            },
        );
        table
    }

    fn predicted() -> Vec<PredictedAddress> {
        vec![prediction("mediator", 1, 0x0a), prediction("distributor", 100, 0x0b)]
    }

    #[test]
    fn test_assemble_orders_arguments() {
        let root = B256::from([0x77u8; 32]);
        let out = assemble(root, &predicted(), &params(), &defaults()).unwrap();
        assert_eq!(out.contract, "distributor");
        assert_eq!(out.chain_id, 100);
        assert_eq!(out.address, Address::from([0x0bu8; 20]));
        assert_eq!(out.merkle_root, root);

        let names: Vec<&str> = out.args.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["merkleRoot", "token", "bridge", "mediator", "counterpart", "tokenPrice"]
        );
        assert_eq!(out.args[0].value, ArgValue::Bytes32(root));
        assert_eq!(
            out.args[1].value,
            ArgValue::Address(Address::from([0x55u8; 20]))
        );
        assert_eq!(
            out.args[4].value,
            ArgValue::Address(Address::from([0x0au8; 20]))
        );
        assert_eq!(
            out.args[5].value,
            ArgValue::Uint256(U256::from(250_000_000_000_000u64))
        );
    }

    #[test]
    fn test_assemble_is_pure() {
        let root = B256::from([0x01u8; 32]);
        assert_eq!(
            assemble(root, &predicted(), &params(), &defaults()).unwrap(),
            assemble(root, &predicted(), &params(), &defaults()).unwrap()
        );
    }

    fn missing_field(params: &ParamSettings, table: &BTreeMap<u64, ChainDefaults>) -> String {
        match assemble(B256::ZERO, &predicted(), params, table) {
            Err(PlanError::SettingsValidation { field, .. }) => field,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_missing_fields_are_named() {
        let mut p = params();
        p.bridge = None;
        assert_eq!(missing_field(&p, &defaults()), "params.bridge");

        let mut p = params();
        p.token_price = Some("  ".to_string());
        assert_eq!(missing_field(&p, &defaults()), "params.token_price");

        let mut p = params();
        p.target_contract = None;
        assert_eq!(missing_field(&p, &defaults()), "params.target_contract");

        assert_eq!(
            missing_field(&params(), &BTreeMap::new()),
            "chain_defaults.100.token"
        );
    }

    #[test]
    fn test_unknown_counterpart_is_rejected() {
        let mut p = params();
        p.counterpart_contract = Some("nope".to_string());
        assert_eq!(missing_field(&p, &defaults()), "params.counterpart_contract");
    }
}
