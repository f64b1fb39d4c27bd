// SPDX-License-Identifier: MIT
use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::constants::{LEAF_DOMAIN, LEAF_ENCODING_VERSION, LEAF_PREIMAGE_LEN};

/// Closed set of distribution categories. The discriminant is part of the leaf encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    Airdrop = 0,
    Investor = 1,
    Team = 2,
    Advisor = 3,
}

impl ClaimType {
    pub const ALL: [ClaimType; 4] = [
        ClaimType::Airdrop,
        ClaimType::Investor,
        ClaimType::Team,
        ClaimType::Advisor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClaimType::Airdrop => "airdrop",
            ClaimType::Investor => "investor",
            ClaimType::Team => "team",
            ClaimType::Advisor => "advisor",
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ClaimType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                format!("unknown claim type '{needle}'. Expected one of: airdrop, investor, team, advisor")
            })
    }
}

/// One beneficiary entitlement. Constructed only by the claims loader, which
/// guarantees a non-zero address and a non-zero amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub address: Address,
    #[serde(with = "crate::serde_helpers::decimal")]
    pub amount: U256,
    pub claim_type: ClaimType,
}

impl Claim {
    /// Canonical v1 leaf preimage:
    /// `LEAF_DOMAIN ‖ LEAF_ENCODING_VERSION ‖ address[20] ‖ amount[32, BE] ‖ claim_type[1]`.
    pub fn leaf_preimage(&self) -> [u8; LEAF_PREIMAGE_LEN] {
        let mut buf = [0u8; LEAF_PREIMAGE_LEN];
        buf[0] = LEAF_DOMAIN;
        buf[1] = LEAF_ENCODING_VERSION;
        buf[2..22].copy_from_slice(self.address.as_slice());
        buf[22..54].copy_from_slice(&self.amount.to_be_bytes::<32>());
        buf[54] = self.claim_type.code();
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_type_parse_is_case_insensitive() {
        assert_eq!("Airdrop".parse::<ClaimType>().unwrap(), ClaimType::Airdrop);
        assert_eq!(" TEAM ".parse::<ClaimType>().unwrap(), ClaimType::Team);
        assert!("founder".parse::<ClaimType>().is_err());
    }

    #[test]
    fn test_leaf_preimage_layout() {
        let claim = Claim {
            address: Address::from([0xaau8; 20]),
            amount: U256::from(0x0102u64),
            claim_type: ClaimType::Advisor,
        };
        let pre = claim.leaf_preimage();
        assert_eq!(pre[0], LEAF_DOMAIN);
        assert_eq!(pre[1], LEAF_ENCODING_VERSION);
        assert_eq!(&pre[2..22], &[0xaa; 20]);
        assert_eq!(pre[52], 0x01);
        assert_eq!(pre[53], 0x02);
        assert_eq!(pre[54], 3);
    }

    #[test]
    fn test_claim_serializes_amount_as_decimal() {
        let claim = Claim {
            address: Address::from([0x11u8; 20]),
            amount: U256::from(100u64),
            claim_type: ClaimType::Investor,
        };
        let json = serde_json::to_value(&claim).unwrap();
        assert_eq!(json["amount"], "100");
        assert_eq!(json["claim_type"], "investor");
    }
}
