//! The proving backend seam.
//!
//! Proof generation is the one slow step of a withdrawal. Everything else in
//! the workspace talks to it through [`ProvingBackend`], so the tree and
//! witness logic can be tested against [`MockBackend`] while production
//! wires in [`Groth16Backend`](crate::groth16::Groth16Backend).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ark_bn254::Fr;

use mixer_circuits::to_bytes32;

use crate::error::ProveError;
use crate::witness::Witness;

/// Proof blob plus the public inputs it was generated for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofBundle {
    pub proof: Vec<u8>,
    pub public_inputs: Vec<Fr>,
}

/// Turns a withdrawal witness into a proof.
///
/// Implementations are blocking and CPU bound; callers that must stay
/// responsive run them on a dedicated worker.
pub trait ProvingBackend: Send + Sync {
    fn prove(&self, witness: &Witness) -> Result<ProofBundle, ProveError>;
}

impl<B: ProvingBackend + ?Sized> ProvingBackend for &B {
    fn prove(&self, witness: &Witness) -> Result<ProofBundle, ProveError> {
        (**self).prove(witness)
    }
}

impl<B: ProvingBackend + ?Sized> ProvingBackend for Arc<B> {
    fn prove(&self, witness: &Witness) -> Result<ProofBundle, ProveError> {
        (**self).prove(witness)
    }
}

impl<B: ProvingBackend + ?Sized> ProvingBackend for Box<B> {
    fn prove(&self, witness: &Witness) -> Result<ProofBundle, ProveError> {
        (**self).prove(witness)
    }
}

/// Deterministic stand-in for a real prover.
///
/// The "proof" is `root ‖ nullifier_hash`, so equal witnesses give equal
/// bundles. An optional delay simulates proving time.
#[derive(Debug, Default)]
pub struct MockBackend {
    delay: Duration,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// A backend whose every call fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Number of `prove` calls so far, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProvingBackend for MockBackend {
    fn prove(&self, witness: &Witness) -> Result<ProofBundle, ProveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if let Some(reason) = &self.failure {
            return Err(ProveError::Backend(reason.clone()));
        }

        let mut proof = Vec::with_capacity(64);
        proof.extend_from_slice(&to_bytes32(&witness.root));
        proof.extend_from_slice(&to_bytes32(&witness.nullifier_hash));

        Ok(ProofBundle {
            proof,
            public_inputs: witness.public_inputs().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::witness::assemble_witness;
    use mixer_circuits::{DepositNote, PoseidonHasher};

    fn witness() -> Witness {
        let hasher = PoseidonHasher::new();
        let note = DepositNote::from_parts(Fr::from(4u64), Fr::from(5u64), &hasher);
        assemble_witness(&hasher, note.nullifier, note.secret, Fr::from(6u64), &[note.commitment], 3)
            .unwrap()
    }

    #[test]
    fn test_mock_backend_is_deterministic() {
        let backend = MockBackend::new();
        let w = witness();

        let first = backend.prove(&w).unwrap();
        let second = backend.prove(&w).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.proof.len(), 64);
        assert_eq!(first.public_inputs, w.public_inputs().to_vec());
        assert_eq!(backend.calls(), 2);
    }

    #[test]
    fn test_failing_backend_reports_reason() {
        let backend = MockBackend::failing("out of memory");
        let err = backend.prove(&witness()).unwrap_err();

        assert!(matches!(err, ProveError::Backend(ref r) if r == "out of memory"));
        assert_eq!(backend.calls(), 1);
    }

    #[test]
    fn test_backend_through_trait_object() {
        let backend: Arc<dyn ProvingBackend> = Arc::new(MockBackend::new());
        assert!(backend.prove(&witness()).is_ok());
    }
}
