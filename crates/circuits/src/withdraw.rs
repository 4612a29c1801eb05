//! Withdraw circuit.
//!
//! Proves knowledge of `(nullifier, secret)` whose commitment is a leaf of
//! the tree with the given root, and that the published nullifier hash is
//! `H(nullifier)`, without revealing the leaf.
//!
//! Public inputs, in order: `root`, `nullifier_hash`, `recipient`.
//! Private inputs: `secret`, `nullifier`, `merkle_proof[depth]`,
//! `is_even[depth]`.

use std::sync::Arc;

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::merkle::{compute_root_from_path, MerkleProofVar};
use crate::poseidon::{poseidon_hash_two_var, poseidon_hash_var};

/// Number of public inputs the withdraw circuit exposes.
pub const WITHDRAW_PUBLIC_INPUTS: usize = 3;

#[derive(Clone)]
pub struct WithdrawCircuit {
    config: Arc<PoseidonConfig<Fr>>,
    depth: usize,

    // Public inputs
    pub root: Option<Fr>,
    pub nullifier_hash: Option<Fr>,
    pub recipient: Option<Fr>,

    // Private inputs
    pub secret: Option<Fr>,
    pub nullifier: Option<Fr>,
    pub merkle_proof: Option<Vec<Fr>>,
    pub is_even: Option<Vec<bool>>,
}

impl WithdrawCircuit {
    /// Circuit shape for key generation.
    /// Uses dummy values that produce the full constraint structure.
    pub fn empty(config: Arc<PoseidonConfig<Fr>>, depth: usize) -> Self {
        Self {
            config,
            depth,
            root: Some(Fr::from(0u64)),
            nullifier_hash: Some(Fr::from(0u64)),
            recipient: Some(Fr::from(0u64)),
            secret: Some(Fr::from(0u64)),
            nullifier: Some(Fr::from(0u64)),
            merkle_proof: Some(vec![Fr::from(0u64); depth]),
            is_even: Some(vec![true; depth]),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<PoseidonConfig<Fr>>,
        root: Fr,
        nullifier_hash: Fr,
        recipient: Fr,
        secret: Fr,
        nullifier: Fr,
        merkle_proof: Vec<Fr>,
        is_even: Vec<bool>,
    ) -> Self {
        Self {
            config,
            depth: merkle_proof.len(),
            root: Some(root),
            nullifier_hash: Some(nullifier_hash),
            recipient: Some(recipient),
            secret: Some(secret),
            nullifier: Some(nullifier),
            merkle_proof: Some(merkle_proof),
            is_even: Some(is_even),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl ConstraintSynthesizer<Fr> for WithdrawCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        // === Allocate public inputs ===
        let root_var = FpVar::new_input(cs.clone(), || {
            self.root.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let nullifier_hash_var = FpVar::new_input(cs.clone(), || {
            self.nullifier_hash.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let recipient_var = FpVar::new_input(cs.clone(), || {
            self.recipient.ok_or(SynthesisError::AssignmentMissing)
        })?;

        // === Allocate private inputs ===
        let secret_var = FpVar::new_witness(cs.clone(), || {
            self.secret.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let nullifier_var = FpVar::new_witness(cs.clone(), || {
            self.nullifier.ok_or(SynthesisError::AssignmentMissing)
        })?;

        // Path length is fixed by the circuit depth, not by the witness.
        let mut path = Vec::with_capacity(self.depth);
        let mut is_even = Vec::with_capacity(self.depth);
        for level in 0..self.depth {
            path.push(FpVar::new_witness(cs.clone(), || {
                self.merkle_proof
                    .as_ref()
                    .and_then(|p| p.get(level).copied())
                    .ok_or(SynthesisError::AssignmentMissing)
            })?);
            is_even.push(Boolean::new_witness(cs.clone(), || {
                self.is_even
                    .as_ref()
                    .and_then(|e| e.get(level).copied())
                    .ok_or(SynthesisError::AssignmentMissing)
            })?);
        }
        let proof_var = MerkleProofVar::from_vars(path, is_even);

        // === Constraint 1: nullifier_hash = H(nullifier) ===
        let computed_nullifier_hash = poseidon_hash_var(cs.clone(), &self.config, &nullifier_var)?;
        computed_nullifier_hash.enforce_equal(&nullifier_hash_var)?;

        // === Constraint 2: H(nullifier, secret) is a leaf under root ===
        let commitment =
            poseidon_hash_two_var(cs.clone(), &self.config, &nullifier_var, &secret_var)?;
        let computed_root = compute_root_from_path(cs.clone(), &self.config, &commitment, &proof_var)?;
        computed_root.enforce_equal(&root_var)?;

        // === Constraint 3: bind recipient ===
        // A public input that appears in no constraint could be swapped by
        // anyone relaying the proof.
        let recipient_square = &recipient_var * &recipient_var;
        let square_var = FpVar::new_witness(cs.clone(), || {
            self.recipient
                .map(|r| r * r)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        recipient_square.enforce_equal(&square_var)?;

        Ok(())
    }
}
