//! Local verification of withdraw proofs.

use ark_bn254::Bn254;
use ark_groth16::{Groth16, Proof, VerifyingKey};
use ark_serialize::CanonicalDeserialize;
use ark_snark::SNARK;
use thiserror::Error;

use mixer_circuits::WITHDRAW_PUBLIC_INPUTS;

use crate::backend::ProofBundle;
use crate::encoding::decode_proof_bundle;

/// Errors during verification
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Verification failed: {0}")]
    Verification(String),
    #[error("Malformed proof: {0}")]
    MalformedProof(String),
    #[error("Expected {} public inputs, got {0}", WITHDRAW_PUBLIC_INPUTS)]
    InvalidInputs(usize),
}

/// Verify a withdraw proof bundle (root, nullifier hash, recipient)
pub fn verify_withdraw(vk: &VerifyingKey<Bn254>, bundle: &ProofBundle) -> Result<bool, VerifyError> {
    if bundle.public_inputs.len() != WITHDRAW_PUBLIC_INPUTS {
        return Err(VerifyError::InvalidInputs(bundle.public_inputs.len()));
    }

    let proof = Proof::<Bn254>::deserialize_compressed(bundle.proof.as_slice())
        .map_err(|e| VerifyError::MalformedProof(e.to_string()))?;

    Groth16::<Bn254>::verify(vk, &bundle.public_inputs, &proof)
        .map_err(|e| VerifyError::Verification(e.to_string()))
}

/// Verify an ABI-encoded `(bytes, bytes32[])` withdrawal tuple
pub fn verify_encoded_withdrawal(vk: &VerifyingKey<Bn254>, data: &[u8]) -> Result<bool, VerifyError> {
    let bundle =
        decode_proof_bundle(data).map_err(|e| VerifyError::MalformedProof(e.to_string()))?;
    verify_withdraw(vk, &bundle)
}
