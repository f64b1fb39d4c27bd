// SPDX-License-Identifier: MIT
//! airdrop-types crate
//!
//! Shared data model for claim commitment and deployment planning. No I/O.

pub mod claim;
pub mod constants;
pub mod conversions;
pub mod error;
pub mod hashing;
pub mod serde_helpers;
pub mod settings;
pub mod types;
