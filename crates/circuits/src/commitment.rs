//! Deposit commitments and nullifier hashes.
//!
//! A deposit is a random `(nullifier, secret)` pair. Only its commitment
//! `H(nullifier, secret)` enters the tree; at withdrawal the depositor
//! reveals `H(nullifier)` so the contract can refuse a second spend.

use ark_bn254::Fr;
use ark_ff::UniformRand;
use rand::{CryptoRng, Rng};

use crate::field::{to_bytes32, FIELD_BYTES};
use crate::hasher::FieldHasher;

/// Size of an encoded deposit: commitment, nullifier and secret words.
pub const DEPOSIT_NOTE_BYTES: usize = 3 * FIELD_BYTES;

/// `H(nullifier, secret)`.
pub fn compute_commitment<H: FieldHasher>(hasher: &H, nullifier: Fr, secret: Fr) -> Fr {
    hasher.hash_two(nullifier, secret)
}

/// `H(nullifier)`.
pub fn derive_nullifier_hash<H: FieldHasher>(hasher: &H, nullifier: Fr) -> Fr {
    hasher.hash_one(nullifier)
}

/// The output of a deposit. The caller persists it; nothing here stores it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepositNote {
    pub commitment: Fr,
    pub nullifier: Fr,
    pub secret: Fr,
}

impl DepositNote {
    /// Sample a fresh nullifier and secret.
    ///
    /// The RNG must be cryptographically secure: anyone who can predict the
    /// nullifier and secret can withdraw the deposit.
    pub fn generate<H, R>(rng: &mut R, hasher: &H) -> Self
    where
        H: FieldHasher,
        R: Rng + CryptoRng,
    {
        let secret = Fr::rand(rng);
        let nullifier = Fr::rand(rng);
        Self::from_parts(nullifier, secret, hasher)
    }

    pub fn from_parts<H: FieldHasher>(nullifier: Fr, secret: Fr, hasher: &H) -> Self {
        Self {
            commitment: compute_commitment(hasher, nullifier, secret),
            nullifier,
            secret,
        }
    }

    pub fn nullifier_hash<H: FieldHasher>(&self, hasher: &H) -> Fr {
        derive_nullifier_hash(hasher, self.nullifier)
    }

    /// `commitment ‖ nullifier ‖ secret`, each 32 bytes big-endian.
    ///
    /// This is byte-for-byte the ABI encoding of
    /// `(bytes32, bytes32, bytes32)`.
    pub fn to_bytes(&self) -> [u8; DEPOSIT_NOTE_BYTES] {
        let mut out = [0u8; DEPOSIT_NOTE_BYTES];
        out[..FIELD_BYTES].copy_from_slice(&to_bytes32(&self.commitment));
        out[FIELD_BYTES..2 * FIELD_BYTES].copy_from_slice(&to_bytes32(&self.nullifier));
        out[2 * FIELD_BYTES..].copy_from_slice(&to_bytes32(&self.secret));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::from_bytes32;
    use crate::poseidon::PoseidonHasher;
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_commitment_binds_both_values() {
        let hasher = PoseidonHasher::new();
        let c = compute_commitment(&hasher, Fr::from(1u64), Fr::from(2u64));

        assert_ne!(c, compute_commitment(&hasher, Fr::from(1u64), Fr::from(3u64)));
        assert_ne!(c, compute_commitment(&hasher, Fr::from(2u64), Fr::from(2u64)));
        // argument order is (nullifier, secret)
        assert_ne!(c, compute_commitment(&hasher, Fr::from(2u64), Fr::from(1u64)));
    }

    #[test]
    fn test_generate_is_consistent() {
        let hasher = PoseidonHasher::new();
        let mut rng = StdRng::seed_from_u64(1);

        let note = DepositNote::generate(&mut rng, &hasher);
        assert_eq!(
            note.commitment,
            compute_commitment(&hasher, note.nullifier, note.secret)
        );
        assert_ne!(note.nullifier, note.secret);

        let other = DepositNote::generate(&mut rng, &hasher);
        assert_ne!(note, other);
    }

    #[test]
    fn test_nullifier_hash_is_deterministic() {
        let hasher = PoseidonHasher::new();
        let note = DepositNote::from_parts(Fr::from(9u64), Fr::from(10u64), &hasher);

        assert_eq!(note.nullifier_hash(&hasher), derive_nullifier_hash(&hasher, Fr::from(9u64)));
        assert_ne!(note.nullifier_hash(&hasher), note.commitment);
    }

    #[test]
    fn test_to_bytes_layout() {
        let hasher = PoseidonHasher::new();
        let note = DepositNote::from_parts(Fr::from(1u64), Fr::from(2u64), &hasher);
        let bytes = note.to_bytes();

        let word = |i: usize| -> [u8; 32] { bytes[i * 32..(i + 1) * 32].try_into().unwrap() };
        assert_eq!(from_bytes32(&word(0)).unwrap(), note.commitment);
        assert_eq!(from_bytes32(&word(1)).unwrap(), Fr::from(1u64));
        assert_eq!(from_bytes32(&word(2)).unwrap(), Fr::from(2u64));
    }
}
