//! Poseidon hash over the BN254 scalar field.
//!
//! One parameter set serves both sides of the proof: [`PoseidonHasher`] for
//! native hashing (commitments, nullifier hashes, tree nodes) and the R1CS
//! gadgets for the withdraw circuit. Both read [`poseidon_config`], so a
//! root computed natively is the root the circuit recomputes.

mod config;
mod gadgets;
mod native;


pub use config::{poseidon_config, POSEIDON_PARAMS_VERSION};
pub use gadgets::{poseidon_hash_two_var, poseidon_hash_var};
pub use native::{poseidon_hash, poseidon_hash_two, PoseidonHasher};
