//! Withdrawal proving for the mixer.
//!
//! This crate provides utilities for:
//! - Assembling the withdraw witness from a deposit and a leaf snapshot
//! - The proving backend seam, with a mock and a Groth16 implementation
//! - Trusted setup and local verification of withdraw proofs
//! - ABI encoding of deposit and withdrawal outputs

pub mod backend;
pub mod encoding;
pub mod error;
pub mod groth16;
pub mod setup;
pub mod verify;
pub mod witness;

pub use backend::{MockBackend, ProofBundle, ProvingBackend};
pub use encoding::{decode_deposit, decode_proof_bundle, encode_deposit, encode_proof_bundle};
pub use error::ProveError;
pub use groth16::Groth16Backend;
pub use setup::{load_or_setup, setup_withdraw, CircuitKeyPair, SetupError};
pub use verify::{verify_encoded_withdrawal, verify_withdraw, VerifyError};
pub use witness::{
    assemble_witness, assemble_witness_from_tree, assemble_witnesses, ProverInput, Witness,
    WithdrawRequest,
};
