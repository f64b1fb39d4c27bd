// SPDX-License-Identifier: MIT
//! Textual parsing of chain identities, hashes and amounts.
//!
//! Errors are plain strings; callers wrap them in the `PlanError` variant that
//! names the row or settings field the value came from.

use std::str::FromStr;

use alloy_primitives::{Address, B256, U256};

/// Parse a `0x`-prefixed, 40-hex-digit chain address.
///
/// All-lowercase and all-uppercase forms are accepted as-is. A mixed-case form must
/// carry a valid EIP-55 checksum. The zero address is rejected.
pub fn parse_identity(raw: &str) -> Result<Address, String> {
    let s = raw.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| "address must start with 0x".to_string())?;
    if digits.len() != 40 {
        return Err(format!(
            "address must be 40 hex characters after 0x, got {}",
            digits.len()
        ));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err("address contains non-hex characters".to_string());
    }

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    let address = if has_lower && has_upper {
        let normalized = format!("0x{digits}");
        Address::parse_checksummed(&normalized, None)
            .map_err(|_| "mixed-case address has an invalid EIP-55 checksum".to_string())?
    } else {
        Address::from_str(digits).map_err(|e| format!("invalid address: {e}"))?
    };

    if address == Address::ZERO {
        return Err("zero address is not allowed".to_string());
    }
    Ok(address)
}

/// Parse a 32-byte hex value (salt, code hash, root). `0x` prefix is optional.
pub fn parse_b256(raw: &str) -> Result<B256, String> {
    let s = raw.trim();
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.len() != 64 {
        return Err(format!(
            "expected 64 hex characters, got {}",
            digits.len()
        ));
    }
    B256::from_str(digits).map_err(|e| format!("invalid 32-byte hex value: {e}"))
}

/// Parse a strictly positive base-10 integer of up to 256 bits.
pub fn parse_positive_amount(raw: &str) -> Result<U256, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Err("amount is empty".to_string());
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{s}' is not a non-negative decimal integer"));
    }
    let amount = U256::from_str_radix(s, 10).map_err(|e| format!("invalid amount: {e}"))?;
    if amount.is_zero() {
        return Err("amount must be greater than zero".to_string());
    }
    Ok(amount)
}
