//! Groth16 proving backend over the withdraw circuit.

use std::sync::Arc;

use ark_bn254::{Bn254, Fr};
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_groth16::{Groth16, VerifyingKey};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use ark_serialize::CanonicalSerialize;
use ark_snark::SNARK;
use ark_std::rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, warn};

use mixer_circuits::{PoseidonHasher, WithdrawCircuit};

use crate::backend::{ProofBundle, ProvingBackend};
use crate::error::ProveError;
use crate::setup::CircuitKeyPair;
use crate::witness::Witness;

/// Build the withdraw circuit instance for a witness.
pub fn withdraw_circuit(config: Arc<PoseidonConfig<Fr>>, witness: &Witness) -> WithdrawCircuit {
    WithdrawCircuit::new(
        config,
        witness.root,
        witness.nullifier_hash,
        witness.recipient,
        witness.secret,
        witness.nullifier,
        witness.path_elements().to_vec(),
        witness.is_even(),
    )
}

/// Proves withdrawals with a fixed key pair.
pub struct Groth16Backend {
    keys: Arc<CircuitKeyPair>,
    config: Arc<PoseidonConfig<Fr>>,
}

impl Groth16Backend {
    /// `hasher` must be the one the tree was built with.
    pub fn new(keys: CircuitKeyPair, hasher: &PoseidonHasher) -> Self {
        Self {
            keys: Arc::new(keys),
            config: hasher.shared_config(),
        }
    }

    pub fn depth(&self) -> usize {
        self.keys.depth
    }

    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        &self.keys.verifying_key
    }

    /// Check the witness against the constraint system without proving.
    fn check_satisfied(&self, circuit: WithdrawCircuit) -> Result<(), ProveError> {
        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit
            .generate_constraints(cs.clone())
            .map_err(|e| ProveError::Backend(e.to_string()))?;

        let satisfied = cs
            .is_satisfied()
            .map_err(|e| ProveError::Backend(e.to_string()))?;
        if !satisfied {
            let constraint = cs.which_is_unsatisfied().ok().flatten();
            warn!(?constraint, "withdraw witness does not satisfy the circuit");
            return Err(ProveError::Backend(
                "witness does not satisfy the withdraw circuit".to_string(),
            ));
        }

        Ok(())
    }
}

impl ProvingBackend for Groth16Backend {
    fn prove(&self, witness: &Witness) -> Result<ProofBundle, ProveError> {
        if witness.depth() != self.depth() {
            return Err(ProveError::Backend(format!(
                "witness depth {} does not match circuit depth {}",
                witness.depth(),
                self.depth()
            )));
        }

        let circuit = withdraw_circuit(self.config.clone(), witness);
        self.check_satisfied(circuit.clone())?;

        let mut rng = StdRng::from_entropy();
        let proof = Groth16::<Bn254>::prove(&self.keys.proving_key, circuit, &mut rng)
            .map_err(|e| ProveError::Backend(e.to_string()))?;

        let mut bytes = Vec::new();
        proof
            .serialize_compressed(&mut bytes)
            .map_err(|e| ProveError::Serialization(e.to_string()))?;
        debug!(proof_bytes = bytes.len(), "generated withdraw proof");

        Ok(ProofBundle {
            proof: bytes,
            public_inputs: witness.public_inputs().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{decode_proof_bundle, encode_proof_bundle};
    use crate::setup::setup_withdraw;
    use crate::verify::verify_withdraw;
    use crate::witness::assemble_witness;
    use mixer_circuits::{DepositNote, FieldHasher};

    const DEPTH: usize = 3;

    fn backend(hasher: &PoseidonHasher) -> Groth16Backend {
        let mut rng = StdRng::seed_from_u64(42);
        let keys = setup_withdraw(&mut rng, hasher.shared_config(), DEPTH).unwrap();
        Groth16Backend::new(keys, hasher)
    }

    fn witness(hasher: &PoseidonHasher) -> Witness {
        let mut rng = StdRng::seed_from_u64(5);
        let notes: Vec<DepositNote> = (0..4)
            .map(|_| DepositNote::generate(&mut rng, hasher))
            .collect();
        let leaves: Vec<Fr> = notes.iter().map(|n| n.commitment).collect();

        assemble_witness(
            hasher,
            notes[2].nullifier,
            notes[2].secret,
            Fr::from(0xfeedu64),
            &leaves,
            DEPTH,
        )
        .unwrap()
    }

    #[test]
    fn test_prove_verify_and_encode() {
        let hasher = PoseidonHasher::new();
        let backend = backend(&hasher);
        let witness = witness(&hasher);

        let bundle = backend.prove(&witness).unwrap();
        assert_eq!(bundle.public_inputs, witness.public_inputs().to_vec());
        assert!(verify_withdraw(backend.verifying_key(), &bundle).unwrap());

        // The encoded bundle decodes to a proof that still verifies
        let decoded = decode_proof_bundle(&encode_proof_bundle(&bundle)).unwrap();
        assert_eq!(decoded, bundle);
        assert!(verify_withdraw(backend.verifying_key(), &decoded).unwrap());
    }

    #[test]
    fn test_unsatisfied_witness_rejected_before_proving() {
        let hasher = PoseidonHasher::new();
        let backend = backend(&hasher);

        let mut witness = witness(&hasher);
        witness.nullifier_hash = hasher.hash_one(Fr::from(1u64));

        assert!(matches!(
            backend.prove(&witness),
            Err(ProveError::Backend(_))
        ));
    }

    #[test]
    fn test_depth_mismatch_rejected() {
        let hasher = PoseidonHasher::new();
        let backend = backend(&hasher);

        let note = DepositNote::from_parts(Fr::from(1u64), Fr::from(2u64), &hasher);
        let shallow = assemble_witness(
            &hasher,
            note.nullifier,
            note.secret,
            Fr::from(3u64),
            &[note.commitment],
            DEPTH - 1,
        )
        .unwrap();

        let err = backend.prove(&shallow).unwrap_err();
        assert!(matches!(err, ProveError::Backend(ref r) if r.contains("depth")));
    }
}
