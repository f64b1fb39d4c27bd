// SPDX-License-Identifier: MIT
//! host-utils crate
//!
//! Boundary code: RPC, network adapters, input loading, pipeline orchestration, artifact writing.

pub mod artifacts;
pub mod inputs;
pub mod pipeline;
pub mod provider;
pub mod rpc;
