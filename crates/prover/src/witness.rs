//! Withdrawal witness assembly.
//!
//! A withdrawal needs the depositor's `(nullifier, secret)`, the recipient
//! and a snapshot of every commitment in the pool. From those we rebuild
//! the tree, locate the deposit and package the public and private inputs
//! in the order the withdraw circuit expects.

use ark_bn254::Fr;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mixer_circuits::{
    compute_commitment, derive_nullifier_hash, field::from_decimal_str, to_decimal_string,
    FieldHasher, IncrementalMerkleTree, MerkleProof, MAX_DEPTH, WITHDRAW_PUBLIC_INPUTS,
};

use crate::error::ProveError;

/// Everything the withdraw circuit consumes, as field elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Witness {
    // Public inputs
    pub root: Fr,
    pub nullifier_hash: Fr,
    pub recipient: Fr,

    // Private inputs
    pub secret: Fr,
    pub nullifier: Fr,
    pub merkle_proof: MerkleProof,
}

impl Witness {
    /// Public inputs in circuit order: root, nullifier hash, recipient.
    pub fn public_inputs(&self) -> [Fr; WITHDRAW_PUBLIC_INPUTS] {
        [self.root, self.nullifier_hash, self.recipient]
    }

    pub fn depth(&self) -> usize {
        self.merkle_proof.depth()
    }

    pub fn path_elements(&self) -> &[Fr] {
        &self.merkle_proof.path_elements
    }

    pub fn is_even(&self) -> Vec<bool> {
        self.merkle_proof.is_even()
    }

    /// Check the witness natively: the nullifier hash matches and the
    /// commitment hashes up to the root.
    pub fn is_consistent<H: FieldHasher>(&self, hasher: &H) -> bool {
        let commitment = compute_commitment(hasher, self.nullifier, self.secret);
        derive_nullifier_hash(hasher, self.nullifier) == self.nullifier_hash
            && self.merkle_proof.root == self.root
            && self.merkle_proof.verify(commitment, hasher)
    }

    pub fn to_prover_input(&self) -> ProverInput {
        ProverInput {
            root: to_decimal_string(&self.root),
            nullifier_hash: to_decimal_string(&self.nullifier_hash),
            recipient: to_decimal_string(&self.recipient),
            secret: to_decimal_string(&self.secret),
            nullifier: to_decimal_string(&self.nullifier),
            merkle_proof: self
                .merkle_proof
                .path_elements
                .iter()
                .map(to_decimal_string)
                .collect(),
            is_even: self.is_even(),
        }
    }
}

/// Serialisable prover input.
///
/// Field names and array order (leaf to root) are shared with the circuit
/// and must not change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProverInput {
    pub root: String,
    pub nullifier_hash: String,
    pub recipient: String,
    pub secret: String,
    pub nullifier: String,
    pub merkle_proof: Vec<String>,
    pub is_even: Vec<bool>,
}

impl ProverInput {
    pub fn to_json(&self) -> Result<String, ProveError> {
        serde_json::to_string_pretty(self).map_err(|e| ProveError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ProveError> {
        serde_json::from_str(json).map_err(|e| ProveError::Serialization(e.to_string()))
    }

    /// Decode back into field elements.
    ///
    /// The leaf index is rebuilt from the `is_even` flags.
    pub fn to_witness(&self) -> Result<Witness, ProveError> {
        if self.merkle_proof.len() != self.is_even.len() {
            return Err(ProveError::Serialization(format!(
                "merkle_proof has {} elements but is_even has {}",
                self.merkle_proof.len(),
                self.is_even.len()
            )));
        }
        if self.is_even.len() > MAX_DEPTH {
            return Err(ProveError::Serialization(format!(
                "path of {} levels exceeds the maximum depth of {}",
                self.is_even.len(),
                MAX_DEPTH
            )));
        }

        let root = from_decimal_str(&self.root)?;
        let path_elements = self
            .merkle_proof
            .iter()
            .map(|s| from_decimal_str(s))
            .collect::<Result<Vec<_>, _>>()?;
        let path_indices: Vec<u8> = self.is_even.iter().map(|&even| u8::from(!even)).collect();
        let leaf_index = path_indices
            .iter()
            .enumerate()
            .fold(0u64, |acc, (level, bit)| acc | (u64::from(*bit) << level));

        Ok(Witness {
            root,
            nullifier_hash: from_decimal_str(&self.nullifier_hash)?,
            recipient: from_decimal_str(&self.recipient)?,
            secret: from_decimal_str(&self.secret)?,
            nullifier: from_decimal_str(&self.nullifier)?,
            merkle_proof: MerkleProof {
                root,
                leaf_index,
                path_elements,
                path_indices,
            },
        })
    }
}

/// Build the withdrawal witness for a deposit from the full leaf snapshot.
///
/// Fails if the snapshot overflows a depth-`depth` tree or does not contain
/// `H(nullifier, secret)`.
pub fn assemble_witness<H: FieldHasher>(
    hasher: &H,
    nullifier: Fr,
    secret: Fr,
    recipient: Fr,
    leaves: &[Fr],
    depth: usize,
) -> Result<Witness, ProveError> {
    let tree = IncrementalMerkleTree::build(leaves, depth, hasher)?;
    assemble_witness_from_tree(hasher, &tree, nullifier, secret, recipient)
}

/// Same as [`assemble_witness`] against an already built tree.
pub fn assemble_witness_from_tree<H: FieldHasher>(
    hasher: &H,
    tree: &IncrementalMerkleTree,
    nullifier: Fr,
    secret: Fr,
    recipient: Fr,
) -> Result<Witness, ProveError> {
    let commitment = compute_commitment(hasher, nullifier, secret);
    let index = tree.get_index(commitment)?;
    let merkle_proof = tree.proof(index)?;

    debug!(
        leaf_index = index,
        leaves = tree.len(),
        depth = tree.depth(),
        "assembled withdrawal witness"
    );

    Ok(Witness {
        root: merkle_proof.root,
        nullifier_hash: derive_nullifier_hash(hasher, nullifier),
        recipient,
        secret,
        nullifier,
        merkle_proof,
    })
}

/// One withdrawal request against a shared snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WithdrawRequest {
    pub nullifier: Fr,
    pub secret: Fr,
    pub recipient: Fr,
}

/// Assemble witnesses for several deposits of the same snapshot.
///
/// The tree is built once; each path is independent, so they are computed
/// in parallel. Fails on the first request whose commitment is missing.
pub fn assemble_witnesses<H: FieldHasher>(
    hasher: &H,
    tree: &IncrementalMerkleTree,
    requests: &[WithdrawRequest],
) -> Result<Vec<Witness>, ProveError> {
    #[cfg(feature = "parallel")]
    let iter = requests.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = requests.iter();

    iter.map(|r| assemble_witness_from_tree(hasher, tree, r.nullifier, r.secret, r.recipient))
        .collect()
}
