// SPDX-License-Identifier: MIT
//! Commitment builder: binary Keccak tree over claim leaves.
//!
//! Pairing is left to right. A level with an odd count promotes its last node to the
//! next level unchanged, so that node contributes no proof step for that level. A
//! single leaf is its own root and has an empty proof. The on-chain verifier must fold
//! proofs with `hashing::fold_proof` semantics.

use alloy_primitives::B256;
use tracing::debug;

use airdrop_types::claim::Claim;
use airdrop_types::error::PlanError;
use airdrop_types::hashing::{fold_proof, leaf_hash, node_hash};
use airdrop_types::types::{ClaimProofEntry, ProofStep, Side};

/// All levels of a built tree, leaves first, root level last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentTree {
    levels: Vec<Vec<B256>>,
}

impl CommitmentTree {
    /// Build from leaf hashes in order. Fails on an empty leaf sequence.
    pub fn from_leaves(leaves: Vec<B256>) -> Result<Self, PlanError> {
        if leaves.is_empty() {
            return Err(PlanError::deploy_plan("cannot commit to an empty claim set"));
        }

        let mut levels = vec![leaves];
        while let Some(level) = levels.last().filter(|level| level.len() > 1) {
            let parent = next_level(level);
            levels.push(parent);
        }

        debug!(leaves = levels[0].len(), depth = levels.len() - 1, "Built commitment tree");
        Ok(CommitmentTree { levels })
    }

    pub fn from_claims(claims: &[Claim]) -> Result<Self, PlanError> {
        Self::from_leaves(claims.iter().map(leaf_hash).collect())
    }

    pub fn root(&self) -> B256 {
        // Construction guarantees a final level holding exactly one node.
        self.levels[self.levels.len() - 1][0]
    }

    pub fn leaves(&self) -> &[B256] {
        &self.levels[0]
    }

    /// Number of hashing levels above the leaves.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Inclusion proof for the leaf at `index`, bottom level first.
    pub fn proof(&self, index: usize) -> Option<Vec<ProofStep>> {
        if index >= self.levels[0].len() {
            return None;
        }

        let mut proof = Vec::with_capacity(self.depth());
        let mut position = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_index = position ^ 1;
            if let Some(sibling) = level.get(sibling_index) {
                let side = if position % 2 == 0 {
                    Side::Right
                } else {
                    Side::Left
                };
                proof.push(ProofStep {
                    sibling: *sibling,
                    side,
                });
            }
            position /= 2;
        }
        Some(proof)
    }
}

fn next_level(level: &[B256]) -> Vec<B256> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => node_hash(left, right),
            _ => pair[0],
        })
        .collect()
}

/// Root plus one proof-carrying entry per claim, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commitment {
    pub root: B256,
    pub depth: usize,
    pub entries: Vec<ClaimProofEntry>,
}

/// Commit to `claims` and derive every inclusion proof.
pub fn commit(claims: &[Claim]) -> Result<Commitment, PlanError> {
    let tree = CommitmentTree::from_claims(claims)?;
    let entries = claims
        .iter()
        .zip(tree.leaves())
        .enumerate()
        .map(|(index, (claim, leaf))| ClaimProofEntry {
            index,
            claim: claim.clone(),
            leaf: *leaf,
            proof: tree.proof(index).unwrap_or_default(),
        })
        .collect();

    Ok(Commitment {
        root: tree.root(),
        depth: tree.depth(),
        entries,
    })
}

/// Check that `claim` is committed under `root` via `proof`.
pub fn verify_proof(claim: &Claim, proof: &[ProofStep], root: B256) -> bool {
    fold_proof(leaf_hash(claim), proof) == root
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdrop_types::claim::ClaimType;
    use alloy_primitives::{Address, U256};

    fn claims(n: usize) -> Vec<Claim> {
        (0..n)
            .map(|i| {
                let mut addr = [0u8; 20];
                addr[0] = 0xaa;
                addr[12..20].copy_from_slice(&(i as u64 + 1).to_be_bytes());
                Claim {
                    address: Address::from(addr),
                    amount: U256::from(100u64 + i as u64),
                    claim_type: ClaimType::ALL[i % 4],
                }
            })
            .collect()
    }

    #[test]
    fn test_single_claim_root_is_leaf() {
        let input = claims(1);
        let commitment = commit(&input).unwrap();
        assert_eq!(commitment.root, leaf_hash(&input[0]));
        assert_eq!(commitment.depth, 0);
        assert!(commitment.entries[0].proof.is_empty());
    }

    #[test]
    fn test_empty_claims_fail() {
        assert!(matches!(commit(&[]), Err(PlanError::DeployPlan { .. })));
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let input = claims(13);
        assert_eq!(commit(&input).unwrap(), commit(&input).unwrap());
    }

    #[test]
    fn test_every_proof_folds_to_root() {
        for n in 1..=33 {
            let input = claims(n);
            let commitment = commit(&input).unwrap();
            for entry in &commitment.entries {
                assert!(
                    verify_proof(&entry.claim, &entry.proof, commitment.root),
                    "n={n} index={}",
                    entry.index
                );
                assert!(entry.verify(commitment.root));
            }
        }
    }

    #[test]
    fn test_odd_node_is_promoted() {
        let input = claims(3);
        let leaves: Vec<B256> = input.iter().map(leaf_hash).collect();
        let tree = CommitmentTree::from_leaves(leaves.clone()).unwrap();
        let expected = node_hash(&node_hash(&leaves[0], &leaves[1]), &leaves[2]);
        assert_eq!(tree.root(), expected);

        // Promoted leaf skips the level where it had no sibling.
        let proof = tree.proof(2).unwrap();
        assert_eq!(proof.len(), 1);
        assert_eq!(proof[0].side, Side::Left);
    }

    #[test]
    fn test_proof_out_of_range() {
        let tree = CommitmentTree::from_claims(&claims(4)).unwrap();
        assert!(tree.proof(4).is_none());
    }

    #[test]
    fn test_reordering_changes_root() {
        let input = claims(4);
        let mut swapped = input.clone();
        swapped.swap(0, 1);
        assert_ne!(commit(&input).unwrap().root, commit(&swapped).unwrap().root);
    }

    #[test]
    fn test_tampered_claim_fails() {
        let input = claims(6);
        let commitment = commit(&input).unwrap();
        let entry = &commitment.entries[4];

        for byte in 0..20 {
            let mut raw = [0u8; 20];
            raw.copy_from_slice(entry.claim.address.as_slice());
            raw[byte] ^= 0x01;
            let mut claim = entry.claim.clone();
            claim.address = Address::from(raw);
            assert!(!verify_proof(&claim, &entry.proof, commitment.root));
        }

        let mut claim = entry.claim.clone();
        claim.amount += U256::from(1u64);
        assert!(!verify_proof(&claim, &entry.proof, commitment.root));

        let mut claim = entry.claim.clone();
        claim.claim_type = ClaimType::Team;
        assert_ne!(claim.claim_type, entry.claim.claim_type);
        assert!(!verify_proof(&claim, &entry.proof, commitment.root));
    }

    #[test]
    fn test_tampered_proof_fails() {
        let input = claims(6);
        let commitment = commit(&input).unwrap();
        let entry = &commitment.entries[1];

        for step in 0..entry.proof.len() {
            for byte in 0..32 {
                let mut proof = entry.proof.clone();
                let mut sibling = proof[step].sibling.0;
                sibling[byte] ^= 0x80;
                proof[step].sibling = B256::from(sibling);
                assert!(!verify_proof(&entry.claim, &proof, commitment.root));
            }

            let mut proof = entry.proof.clone();
            proof[step].side = match proof[step].side {
                Side::Left => Side::Right,
                Side::Right => Side::Left,
            };
            assert!(!verify_proof(&entry.claim, &proof, commitment.root));
        }

        let mut truncated = entry.proof.clone();
        truncated.pop();
        assert!(!verify_proof(&entry.claim, &truncated, commitment.root));
    }

    #[test]
    fn test_tampered_root_fails() {
        let input = claims(5);
        let commitment = commit(&input).unwrap();
        let entry = &commitment.entries[0];
        for byte in 0..32 {
            let mut root = commitment.root.0;
            root[byte] ^= 0x01;
            assert!(!verify_proof(&entry.claim, &entry.proof, B256::from(root)));
        }
    }
}
