//! ABI codecs for the on-chain verifier.
//!
//! Deposit: `(bytes32 commitment, bytes32 nullifier, bytes32 secret)`.
//! Withdrawal: `(bytes proof, bytes32[] publicInputs)`.
//!
//! Both are encoded as top-level parameter lists (no outer offset word),
//! with every field element as a 32-byte big-endian word.

use alloy_primitives::{Bytes, B256};
use alloy_sol_types::SolValue;
use ark_bn254::Fr;

use mixer_circuits::{from_bytes32, to_bytes32, DepositNote};

use crate::backend::ProofBundle;
use crate::error::ProveError;

fn to_word(e: &Fr) -> B256 {
    B256::from(to_bytes32(e))
}

fn from_word(word: &B256) -> Result<Fr, ProveError> {
    Ok(from_bytes32(&word.0)?)
}

pub fn encode_deposit(note: &DepositNote) -> Vec<u8> {
    (
        to_word(&note.commitment),
        to_word(&note.nullifier),
        to_word(&note.secret),
    )
        .abi_encode_params()
}

/// Decode a deposit tuple. The commitment is returned as encoded and is
/// not recomputed.
pub fn decode_deposit(data: &[u8]) -> Result<DepositNote, ProveError> {
    let (commitment, nullifier, secret) = <(B256, B256, B256)>::abi_decode_params(data, true)
        .map_err(|e| ProveError::Encoding(e.to_string()))?;

    Ok(DepositNote {
        commitment: from_word(&commitment)?,
        nullifier: from_word(&nullifier)?,
        secret: from_word(&secret)?,
    })
}

pub fn encode_proof_bundle(bundle: &ProofBundle) -> Vec<u8> {
    let inputs: Vec<B256> = bundle.public_inputs.iter().map(to_word).collect();
    (Bytes::copy_from_slice(&bundle.proof), inputs).abi_encode_params()
}

/// Inverse of [`encode_proof_bundle`]. Public inputs at or above the field
/// modulus are rejected rather than reduced.
pub fn decode_proof_bundle(data: &[u8]) -> Result<ProofBundle, ProveError> {
    let (proof, inputs) = <(Bytes, Vec<B256>)>::abi_decode_params(data, true)
        .map_err(|e| ProveError::Encoding(e.to_string()))?;

    let public_inputs = inputs
        .iter()
        .map(from_word)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ProofBundle {
        proof: proof.to_vec(),
        public_inputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::UniformRand;
    use ark_std::rand::{rngs::StdRng, RngCore, SeedableRng};
    use mixer_circuits::{FieldError, PoseidonHasher, DEPOSIT_NOTE_BYTES};

    fn word(data: &[u8], i: usize) -> &[u8] {
        &data[i * 32..(i + 1) * 32]
    }

    fn word_value(data: &[u8], i: usize) -> u64 {
        let w = word(data, i);
        assert!(w[..24].iter().all(|b| *b == 0));
        u64::from_be_bytes(w[24..].try_into().unwrap())
    }

    #[test]
    fn test_deposit_matches_note_bytes() {
        let hasher = PoseidonHasher::new();
        let mut rng = StdRng::seed_from_u64(3);
        let note = DepositNote::generate(&mut rng, &hasher);

        let encoded = encode_deposit(&note);
        assert_eq!(encoded.len(), DEPOSIT_NOTE_BYTES);
        assert_eq!(encoded, note.to_bytes().to_vec());
        assert_eq!(decode_deposit(&encoded).unwrap(), note);
    }

    #[test]
    fn test_deposit_rejects_short_input() {
        assert!(matches!(
            decode_deposit(&[0u8; 95]),
            Err(ProveError::Encoding(_))
        ));
    }

    #[test]
    fn test_proof_bundle_layout() {
        let bundle = ProofBundle {
            proof: vec![0xaa, 0xbb, 0xcc],
            public_inputs: vec![Fr::from(1u64), Fr::from(2u64)],
        };
        let data = encode_proof_bundle(&bundle);

        // head: offset of bytes, offset of array
        assert_eq!(word_value(&data, 0), 0x40);
        assert_eq!(word_value(&data, 1), 0x80);
        // bytes: length then right-padded data
        assert_eq!(word_value(&data, 2), 3);
        assert_eq!(&word(&data, 3)[..3], &[0xaa, 0xbb, 0xcc]);
        assert!(word(&data, 3)[3..].iter().all(|b| *b == 0));
        // bytes32[]: length then elements
        assert_eq!(word_value(&data, 4), 2);
        assert_eq!(word_value(&data, 5), 1);
        assert_eq!(word_value(&data, 6), 2);
        assert_eq!(data.len(), 7 * 32);
    }

    #[test]
    fn test_proof_bundle_roundtrip() {
        let mut rng = StdRng::seed_from_u64(11);

        for (proof_len, inputs) in [(0usize, 0usize), (1, 3), (32, 1), (33, 3), (256, 8)] {
            let mut proof = vec![0u8; proof_len];
            rng.fill_bytes(&mut proof);
            let bundle = ProofBundle {
                proof,
                public_inputs: (0..inputs).map(|_| Fr::rand(&mut rng)).collect(),
            };

            let decoded = decode_proof_bundle(&encode_proof_bundle(&bundle)).unwrap();
            assert_eq!(decoded, bundle, "proof {} bytes, {} inputs", proof_len, inputs);
        }
    }

    #[test]
    fn test_proof_bundle_rejects_unreduced_input() {
        let data = (Bytes::from(vec![1u8]), vec![B256::repeat_byte(0xff)]).abi_encode_params();
        assert!(matches!(
            decode_proof_bundle(&data),
            Err(ProveError::Field(FieldError::Range(_)))
        ));
    }

    #[test]
    fn test_proof_bundle_rejects_truncated_input() {
        let bundle = ProofBundle {
            proof: vec![7u8; 40],
            public_inputs: vec![Fr::from(9u64)],
        };
        let data = encode_proof_bundle(&bundle);
        assert!(matches!(
            decode_proof_bundle(&data[..data.len() - 1]),
            Err(ProveError::Encoding(_))
        ));
    }
}
