// SPDX-License-Identifier: MIT
//! Leaf and node hashing shared by the tree builder and every proof verifier.

use alloy_primitives::{keccak256, B256};

use crate::claim::Claim;
use crate::constants::NODE_DOMAIN;
use crate::types::{ProofStep, Side};

/// Keccak256 over the canonical v1 leaf preimage.
pub fn leaf_hash(claim: &Claim) -> B256 {
    keccak256(claim.leaf_preimage())
}

/// Parent of two adjacent nodes: `keccak256(NODE_DOMAIN ‖ left ‖ right)`.
pub fn node_hash(left: &B256, right: &B256) -> B256 {
    let mut buf = [0u8; 65];
    buf[0] = NODE_DOMAIN;
    buf[1..33].copy_from_slice(left.as_slice());
    buf[33..].copy_from_slice(right.as_slice());
    keccak256(buf)
}

/// Recompute a root by folding `proof` over `leaf`, bottom level first.
pub fn fold_proof(leaf: B256, proof: &[ProofStep]) -> B256 {
    proof.iter().fold(leaf, |acc, step| match step.side {
        Side::Left => node_hash(&step.sibling, &acc),
        Side::Right => node_hash(&acc, &step.sibling),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_hash_is_ordered() {
        let a = B256::from([1u8; 32]);
        let b = B256::from([2u8; 32]);
        assert_ne!(node_hash(&a, &b), node_hash(&b, &a));
    }

    #[test]
    fn test_node_hash_differs_from_plain_concat() {
        let a = B256::from([1u8; 32]);
        let b = B256::from([2u8; 32]);
        let mut plain = [0u8; 64];
        plain[..32].copy_from_slice(a.as_slice());
        plain[32..].copy_from_slice(b.as_slice());
        assert_ne!(node_hash(&a, &b), keccak256(plain));
    }

    #[test]
    fn test_fold_empty_proof_is_identity() {
        let leaf = B256::from([9u8; 32]);
        assert_eq!(fold_proof(leaf, &[]), leaf);
    }

    #[test]
    fn test_fold_respects_side() {
        let leaf = B256::from([3u8; 32]);
        let sibling = B256::from([4u8; 32]);
        let left = fold_proof(leaf, &[ProofStep { sibling, side: Side::Left }]);
        let right = fold_proof(leaf, &[ProofStep { sibling, side: Side::Right }]);
        assert_eq!(left, node_hash(&sibling, &leaf));
        assert_eq!(right, node_hash(&leaf, &sibling));
    }
}
