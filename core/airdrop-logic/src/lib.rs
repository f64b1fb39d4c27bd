// SPDX-License-Identifier: MIT
//! airdrop-logic crate
//!
//! Pure pipeline stages: claim loading, commitment, address prediction,
//! consistency verification and parameter assembly. No network, no filesystem.

pub mod claims;
pub mod merkle;
pub mod params;
pub mod predictor;
pub mod verifier;
