// SPDX-License-Identifier: MIT
//! Consistency verifier: gates the run before anything is written.

use std::collections::BTreeMap;
use std::str::FromStr;

use alloy_primitives::Address;
use tracing::{info, warn};

use airdrop_types::error::PlanError;
use airdrop_types::types::PredictedAddress;

/// Abort unless the provider's chain id is the one this deployment targets.
pub fn check_network(expected: u64, found: u64) -> Result<(), PlanError> {
    if expected != found {
        return Err(PlanError::NetworkIdentityMismatch { expected, found });
    }
    Ok(())
}

/// Outcome of comparing every prediction with its expectation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// Contracts whose expectation matched.
    pub matched: Vec<String>,
    /// Contracts with no expectation configured (warned, not fatal).
    pub unverified: Vec<String>,
}

/// Hex comparison ignores case, so checksums are not enforced on expectations.
fn parse_expected(contract: &str, raw: &str) -> Result<Address, PlanError> {
    let s = raw.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.len() != 40 {
        return Err(PlanError::settings(
            format!("{contract}.expected_address"),
            format!("'{raw}' is not a 20-byte hex address"),
        ));
    }
    Address::from_str(&digits.to_ascii_lowercase()).map_err(|e| {
        PlanError::settings(
            format!("{contract}.expected_address"),
            format!("'{raw}' is not a valid address: {e}"),
        )
    })
}

/// Compare predictions with operator expectations keyed by contract name.
///
/// Mismatch is fatal. A missing expectation only warns. An expectation naming a
/// contract that is not predicted is a settings error.
pub fn verify_addresses(
    predicted: &[PredictedAddress],
    expected: &BTreeMap<String, String>,
) -> Result<VerificationReport, PlanError> {
    if let Some(unknown) = expected
        .keys()
        .find(|name| !predicted.iter().any(|p| &p.contract == *name))
    {
        return Err(PlanError::settings(
            format!("{unknown}.expected_address"),
            "no deploy step predicts this contract",
        ));
    }

    let mut report = VerificationReport::default();
    for prediction in predicted {
        match expected.get(&prediction.contract) {
            Some(raw) => {
                let want = parse_expected(&prediction.contract, raw)?;
                if want != prediction.address {
                    return Err(PlanError::AddressMismatch {
                        contract: prediction.contract.clone(),
                        expected: raw.clone(),
                        predicted: prediction.address,
                    });
                }
                info!(contract = %prediction.contract, address = %prediction.address, "Expected address matches");
                report.matched.push(prediction.contract.clone());
            }
            None => {
                warn!(
                    contract = %prediction.contract,
                    chain = %prediction.chain,
                    address = %prediction.address,
                    "No expected address configured; proceeding with the predicted address unverified"
                );
                report.unverified.push(prediction.contract.clone());
            }
        }
    }
    Ok(report)
}
