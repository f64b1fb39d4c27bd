// SPDX-License-Identifier: MIT
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::claim::Claim;
use crate::hashing::{fold_proof, leaf_hash};

// --- Commitment types ---

/// Which side of the running hash a proof sibling sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// One level of an inclusion proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    pub sibling: B256,
    pub side: Side,
}

/// A claim together with its position, leaf hash and inclusion proof.
/// This is the record persisted in the full claims file and in every shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimProofEntry {
    pub index: usize,
    #[serde(flatten)]
    pub claim: Claim,
    pub leaf: B256,
    pub proof: Vec<ProofStep>,
}

impl ClaimProofEntry {
    /// Re-encode the claim and fold the proof. The stored `leaf` must also agree.
    pub fn verify(&self, root: B256) -> bool {
        let leaf = leaf_hash(&self.claim);
        leaf == self.leaf && fold_proof(leaf, &self.proof) == root
    }
}

// --- Deployment types ---

/// How a step's contract address is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "lowercase")]
pub enum AddressScheme {
    /// `CREATE`: depends on the deployer's nonce on that particular chain.
    Create { nonce: u64 },
    /// `CREATE2`: depends only on deployer, salt and init code, so it is the
    /// same on every chain that shares them.
    Create2 { salt: B256, init_code_hash: B256 },
}

impl AddressScheme {
    pub fn is_chain_independent(&self) -> bool {
        matches!(self, AddressScheme::Create2 { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            AddressScheme::Create { .. } => "create",
            AddressScheme::Create2 { .. } => "create2",
        }
    }
}

/// A single deployment action within a chain's ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployStep {
    pub contract: String,
    pub deployer: Address,
    /// Position within the sequence. Stands in for the nonce when no salt is given.
    pub position: usize,
    pub salt: Option<B256>,
    pub init_code_hash: Option<B256>,
}

/// The ordered steps executed against one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySequence {
    pub chain: String,
    pub chain_id: u64,
    /// Deployer nonce before the first step executes.
    pub start_nonce: u64,
    pub steps: Vec<DeployStep>,
}

/// Address a step will occupy once executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictedAddress {
    pub contract: String,
    pub chain: String,
    pub chain_id: u64,
    pub step_index: usize,
    pub deployer: Address,
    pub scheme: AddressScheme,
    pub address: Address,
}

// --- Constructor parameters ---

/// A typed constructor argument value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ArgValue {
    Bytes32(B256),
    Address(Address),
    Uint256(#[serde(with = "crate::serde_helpers::decimal")] U256),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorArg {
    pub name: String,
    #[serde(flatten)]
    pub value: ArgValue,
}

/// Final record consumed by the deploy transaction of the target contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentParameters {
    pub contract: String,
    pub chain_id: u64,
    pub address: Address,
    pub merkle_root: B256,
    /// Constructor arguments in the exact order the constructor declares them.
    pub args: Vec<ConstructorArg>,
}
