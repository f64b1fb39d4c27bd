// SPDX-License-Identifier: MIT
use std::fmt;
use std::path::PathBuf;

use alloy_primitives::Address;

/// Every way a planning run can fail. All variants are fatal to the run.
#[derive(Debug)]
pub enum PlanError {
    /// The provider is connected to a different chain than the deployment targets.
    NetworkIdentityMismatch { expected: u64, found: u64 },
    /// A row of the claims table failed validation. `row` is the 1-based line number.
    ClaimValidation {
        row: usize,
        field: String,
        reason: String,
    },
    /// A settings field is missing or malformed.
    SettingsValidation { field: String, reason: String },
    /// A predicted address disagrees with the operator-supplied expectation.
    AddressMismatch {
        contract: String,
        expected: String,
        predicted: Address,
    },
    /// The deploy step sequence cannot be predicted.
    DeployPlan { reason: String },
    /// Filesystem failure during cleanup or write.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl PlanError {
    pub fn claim(row: usize, field: &str, reason: impl Into<String>) -> Self {
        PlanError::ClaimValidation {
            row,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn settings(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PlanError::SettingsValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::settings(field, "required field is missing")
    }

    pub fn deploy_plan(reason: impl Into<String>) -> Self {
        PlanError::DeployPlan {
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlanError::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::NetworkIdentityMismatch { expected, found } => write!(
                f,
                "connected to chain id {found}, but this deployment targets chain id {expected}"
            ),
            PlanError::ClaimValidation { row, field, reason } => {
                write!(f, "invalid claim at row {row}, field '{field}': {reason}")
            }
            PlanError::SettingsValidation { field, reason } => {
                write!(f, "invalid settings field '{field}': {reason}")
            }
            PlanError::AddressMismatch {
                contract,
                expected,
                predicted,
            } => write!(
                f,
                "address mismatch for contract '{contract}': expected {expected}, predicted {predicted}"
            ),
            PlanError::DeployPlan { reason } => write!(f, "invalid deploy plan: {reason}"),
            PlanError::Io { path, source } => {
                write!(f, "I/O failure on {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for PlanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlanError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
