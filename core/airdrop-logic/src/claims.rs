// SPDX-License-Identifier: MIT
//! Claim loader: turns a CSV claims table into validated, ordered `Claim`s.
//!
//! The header row names the columns; order is free. Blank lines and lines starting
//! with `#` are skipped. Rows are identified by their 1-based line number.

use std::collections::HashMap;

use alloy_primitives::Address;
use airdrop_types::claim::{Claim, ClaimType};
use airdrop_types::conversions::{parse_identity, parse_positive_amount};
use airdrop_types::error::PlanError;

const ADDRESS_COLUMNS: [&str; 3] = ["address", "identity", "beneficiary"];
const AMOUNT_COLUMNS: [&str; 1] = ["amount"];
const TYPE_COLUMNS: [&str; 2] = ["type", "claim_type"];

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    address: usize,
    amount: usize,
    claim_type: usize,
    width: usize,
}

impl Columns {
    fn from_header(row: usize, line: &str) -> Result<Self, PlanError> {
        let names: Vec<String> = split_row(line)
            .into_iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();

        let find = |aliases: &[&str], field: &str| -> Result<usize, PlanError> {
            let hits: Vec<usize> = names
                .iter()
                .enumerate()
                .filter(|(_, name)| aliases.contains(&name.as_str()))
                .map(|(i, _)| i)
                .collect();
            match hits.as_slice() {
                [only] => Ok(*only),
                [] => Err(PlanError::claim(
                    row,
                    field,
                    format!("header has no '{field}' column (accepted: {})", aliases.join(", ")),
                )),
                _ => Err(PlanError::claim(row, field, "header names this column more than once")),
            }
        };

        Ok(Columns {
            address: find(&ADDRESS_COLUMNS, "address")?,
            amount: find(&AMOUNT_COLUMNS, "amount")?,
            claim_type: find(&TYPE_COLUMNS, "type")?,
            width: names.len(),
        })
    }
}

fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn split_row(line: &str) -> Vec<&str> {
    line.split(',')
        .map(|field| {
            let field = field.trim();
            field
                .strip_prefix('"')
                .and_then(|f| f.strip_suffix('"'))
                .unwrap_or(field)
                .trim()
        })
        .collect()
}

/// Parse and validate a claims table. Fails on the first invalid row.
pub fn parse_claims(content: &str) -> Result<Vec<Claim>, PlanError> {
    // Spreadsheet exports often start with a UTF-8 byte order mark.
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut rows = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !is_skippable(line));

    let (header_row, header) = rows
        .next()
        .ok_or_else(|| PlanError::claim(1, "header", "claims table is empty"))?;
    let columns = Columns::from_header(header_row, header)?;

    let mut claims = Vec::new();
    let mut seen: HashMap<(Address, ClaimType), usize> = HashMap::new();

    for (row, line) in rows {
        let fields = split_row(line);
        if fields.len() != columns.width {
            return Err(PlanError::claim(
                row,
                "row",
                format!("expected {} fields, got {}", columns.width, fields.len()),
            ));
        }

        let address = parse_identity(fields[columns.address])
            .map_err(|reason| PlanError::claim(row, "address", reason))?;
        let amount = parse_positive_amount(fields[columns.amount])
            .map_err(|reason| PlanError::claim(row, "amount", reason))?;
        let claim_type = fields[columns.claim_type]
            .parse::<ClaimType>()
            .map_err(|reason| PlanError::claim(row, "type", reason))?;

        if let Some(first) = seen.get(&(address, claim_type)) {
            return Err(PlanError::claim(
                row,
                "address",
                format!("duplicate {claim_type} claim for {address} (first seen at row {first})"),
            ));
        }
        seen.insert((address, claim_type), row);

        claims.push(Claim {
            address,
            amount,
            claim_type,
        });
    }

    if claims.is_empty() {
        return Err(PlanError::claim(header_row, "row", "claims table has no data rows"));
    }

    Ok(claims)
}
