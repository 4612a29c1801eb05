//! Hashing, commitments, the deposit tree and the withdraw circuit for a
//! private mixer over BN254.
//!
//! This crate provides:
//! - `field`: strict codec between field elements, bytes and decimal strings
//! - `poseidon`: the hash used for commitments, nullifier hashes and tree nodes
//! - `commitment`: deposit notes (`H(nullifier, secret)`) and nullifier hashes
//! - `merkle`: fixed-depth incremental tree with lazy empty subtrees
//! - `WithdrawCircuit`: prove a committed note is in the tree without revealing it

pub mod commitment;
pub mod field;
pub mod hasher;
pub mod merkle;
pub mod poseidon;
pub mod withdraw;


pub use commitment::{compute_commitment, derive_nullifier_hash, DepositNote, DEPOSIT_NOTE_BYTES};
pub use field::{
    from_bytes32, from_decimal_str, parse_field_element, to_bytes32, to_decimal_string,
    FieldElement, FieldError, FIELD_BYTES,
};
pub use hasher::{FieldHasher, HashError};
pub use merkle::{
    zero_hashes, IncrementalMerkleTree, MerkleProof, TreeError, DEFAULT_DEPTH, EMPTY_LEAF,
    MAX_DEPTH,
};
pub use poseidon::{poseidon_config, PoseidonHasher, POSEIDON_PARAMS_VERSION};
pub use withdraw::{WithdrawCircuit, WITHDRAW_PUBLIC_INPUTS};
