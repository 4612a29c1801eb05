//! The hash oracle seam.
//!
//! Components never reach for a global hash instance; they receive a
//! `FieldHasher` by reference. Production code passes
//! [`PoseidonHasher`](crate::poseidon::PoseidonHasher), tests may pass any
//! deterministic stand-in.

use ark_bn254::Fr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("hash is defined for 1 or 2 inputs, got {0}")]
    UnsupportedArity(usize),
}

/// A pure, deterministic hash over the BN254 scalar field.
///
/// Only two arities exist: one input (nullifier hash) and two inputs
/// (commitments and tree nodes).
pub trait FieldHasher: Send + Sync {
    fn hash_one(&self, input: Fr) -> Fr;

    fn hash_two(&self, left: Fr, right: Fr) -> Fr;

    fn hash(&self, inputs: &[Fr]) -> Result<Fr, HashError> {
        match inputs {
            [a] => Ok(self.hash_one(*a)),
            [a, b] => Ok(self.hash_two(*a, *b)),
            _ => Err(HashError::UnsupportedArity(inputs.len())),
        }
    }
}

impl<H: FieldHasher + ?Sized> FieldHasher for &H {
    fn hash_one(&self, input: Fr) -> Fr {
        (**self).hash_one(input)
    }

    fn hash_two(&self, left: Fr, right: Fr) -> Fr {
        (**self).hash_two(left, right)
    }
}

impl<H: FieldHasher + ?Sized> FieldHasher for std::sync::Arc<H> {
    fn hash_one(&self, input: Fr) -> Fr {
        (**self).hash_one(input)
    }

    fn hash_two(&self, left: Fr, right: Fr) -> Fr {
        (**self).hash_two(left, right)
    }
}
