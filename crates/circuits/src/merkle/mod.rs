//! Fixed-depth incremental Merkle tree over deposit commitments.
//!
//! This module provides:
//! - Native tree construction, insertion and inclusion proofs
//! - The proof structure handed to the prover
//! - In-circuit path verification gadgets

mod gadgets;
mod proof;
mod tree;


use thiserror::Error;

pub use gadgets::{compute_root_from_path, MerkleProofVar};
pub use proof::MerkleProof;
pub use tree::{zero_hashes, IncrementalMerkleTree, DEFAULT_DEPTH, EMPTY_LEAF, MAX_DEPTH};

/// Errors raised by tree construction and proof generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("{leaves} leaves exceed the capacity of a depth-{depth} tree")]
    Capacity { leaves: u64, depth: usize },
    #[error("leaf {0} is not in the tree")]
    NotFound(String),
    #[error("leaf index {index} is out of range for a depth-{depth} tree")]
    IndexOutOfRange { index: u64, depth: usize },
    #[error("tree depth {0} exceeds the maximum of {}", MAX_DEPTH)]
    DepthTooLarge(usize),
}
