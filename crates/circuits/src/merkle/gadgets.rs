//! In-circuit Merkle path verification.
//!
//! The circuit receives the path as `is_even` booleans rather than position
//! bits: `is_even[i]` is true when the node on the path at level `i` is the
//! left child, i.e. the parent is `H(current, sibling)`.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_r1cs_std::{boolean::Boolean, fields::fp::FpVar, prelude::*};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use super::proof::MerkleProof;
use crate::poseidon::poseidon_hash_two_var;

/// Circuit variable representation of a Merkle path.
#[derive(Clone)]
pub struct MerkleProofVar {
    /// Sibling hashes, leaf to root
    path: Vec<FpVar<Fr>>,

    /// True where the node on the path is the left child
    is_even: Vec<Boolean<Fr>>,
}

impl MerkleProofVar {
    /// Allocate a native proof as witness variables.
    pub fn new_witness(
        cs: ConstraintSystemRef<Fr>,
        proof: &MerkleProof,
    ) -> Result<Self, SynthesisError> {
        Self::new_witness_from_parts(cs, &proof.path_elements, &proof.is_even())
    }

    /// Allocate a path given as sibling values and `is_even` flags.
    pub fn new_witness_from_parts(
        cs: ConstraintSystemRef<Fr>,
        path: &[Fr],
        is_even: &[bool],
    ) -> Result<Self, SynthesisError> {
        if path.len() != is_even.len() {
            return Err(SynthesisError::Unsatisfiable);
        }

        let path = path
            .iter()
            .map(|h| FpVar::new_witness(cs.clone(), || Ok(*h)))
            .collect::<Result<Vec<_>, _>>()?;

        let is_even = is_even
            .iter()
            .map(|&b| Boolean::new_witness(cs.clone(), || Ok(b)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { path, is_even })
    }

    /// Build from already-allocated variables.
    pub fn from_vars(path: Vec<FpVar<Fr>>, is_even: Vec<Boolean<Fr>>) -> Self {
        Self { path, is_even }
    }

    pub fn path(&self) -> &[FpVar<Fr>] {
        &self.path
    }

    pub fn is_even(&self) -> &[Boolean<Fr>] {
        &self.is_even
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

/// Compute the root reached from `leaf` along `proof` in-circuit.
pub fn compute_root_from_path(
    cs: ConstraintSystemRef<Fr>,
    config: &PoseidonConfig<Fr>,
    leaf: &FpVar<Fr>,
    proof: &MerkleProofVar,
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut current = leaf.clone();

    for (sibling, is_even) in proof.path.iter().zip(proof.is_even.iter()) {
        // If is_even: H(current, sibling), else H(sibling, current)
        let left = is_even.select(&current, sibling)?;
        let right = is_even.select(sibling, &current)?;

        current = poseidon_hash_two_var(cs.clone(), config, &left, &right)?;
    }

    Ok(current)
}

#[cfg(test)]
mod gadget_tests {
    use super::*;
    use crate::merkle::IncrementalMerkleTree;
    use crate::poseidon::PoseidonHasher;
    use ark_relations::r1cs::ConstraintSystem;

    fn check_path(depth: usize, leaves: &[Fr], index: u64, flip_level: Option<usize>) -> bool {
        let hasher = PoseidonHasher::new();
        let tree = IncrementalMerkleTree::build(leaves, depth, &hasher).unwrap();
        let proof = tree.proof(index).unwrap();

        let mut is_even = proof.is_even();
        if let Some(level) = flip_level {
            is_even[level] = !is_even[level];
        }

        let cs = ConstraintSystem::<Fr>::new_ref();
        let root_var = FpVar::new_input(cs.clone(), || Ok(tree.root())).unwrap();
        let leaf_var = FpVar::new_witness(cs.clone(), || Ok(leaves[index as usize])).unwrap();
        let proof_var =
            MerkleProofVar::new_witness_from_parts(cs.clone(), &proof.path_elements, &is_even)
                .unwrap();

        let computed = compute_root_from_path(cs.clone(), hasher.config(), &leaf_var, &proof_var)
            .unwrap();
        computed.enforce_equal(&root_var).unwrap();

        cs.is_satisfied().unwrap()
    }

    #[test]
    fn test_native_path_satisfies_gadget() {
        let leaves: Vec<Fr> = (0..5u64).map(|i| Fr::from(i + 11)).collect();
        for index in 0..5 {
            assert!(check_path(4, &leaves, index, None), "index {}", index);
        }
    }

    #[test]
    fn test_flipped_parity_is_rejected() {
        let leaves: Vec<Fr> = (0..5u64).map(|i| Fr::from(i + 11)).collect();
        assert!(!check_path(4, &leaves, 2, Some(0)));
        assert!(!check_path(4, &leaves, 3, Some(1)));
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let result = MerkleProofVar::new_witness_from_parts(
            cs,
            &[Fr::from(1u64), Fr::from(2u64)],
            &[true],
        );
        assert!(result.is_err());
    }
}
