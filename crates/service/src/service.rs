//! Withdrawal proof worker.
//!
//! [`ProofService`] runs witness assembly and proving on tokio's blocking
//! pool so async callers are never stalled by a multi-second proof. While a
//! request for a given nullifier hash is in flight, a second request for
//! the same nullifier hash is refused: only one of them could ever be spent.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use ark_bn254::Fr;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use mixer_circuits::{derive_nullifier_hash, to_decimal_string, PoseidonHasher};
use mixer_prover::{assemble_witness, ProofBundle, ProveError, ProvingBackend};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("a proof for nullifier hash {0} is already being generated")]
    DuplicateNullifier(String),
    #[error(transparent)]
    Prove(#[from] ProveError),
    #[error("proof worker failed: {0}")]
    Worker(#[from] JoinError),
}

/// Inputs of one withdrawal.
#[derive(Clone, Debug)]
pub struct WithdrawalRequest {
    pub nullifier: Fr,
    pub secret: Fr,
    pub recipient: Fr,
    /// Every commitment in the pool, in deposit order
    pub leaves: Vec<Fr>,
}

type InFlight = Arc<Mutex<HashSet<Fr>>>;

/// Holds a nullifier hash in the in-flight set until dropped.
struct InFlightGuard {
    set: InFlight,
    nullifier_hash: Fr,
}

impl InFlightGuard {
    fn claim(set: &InFlight, nullifier_hash: Fr) -> Option<Self> {
        let mut claimed = set.lock().unwrap_or_else(PoisonError::into_inner);
        if !claimed.insert(nullifier_hash) {
            return None;
        }
        Some(Self {
            set: set.clone(),
            nullifier_hash,
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.nullifier_hash);
    }
}

pub struct ProofService<B> {
    backend: Arc<B>,
    hasher: PoseidonHasher,
    depth: usize,
    in_flight: InFlight,
}

impl<B> Clone for ProofService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            hasher: self.hasher.clone(),
            depth: self.depth,
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<B: ProvingBackend + 'static> ProofService<B> {
    pub fn new(backend: Arc<B>, hasher: PoseidonHasher, depth: usize) -> Self {
        Self {
            backend,
            hasher,
            depth,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of requests currently being proven.
    pub fn in_flight(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Assemble the witness for `request` and prove it.
    ///
    /// The nullifier hash stays claimed until the blocking job finishes, on
    /// success and on every error. Dropping the returned future does not
    /// release it early: the proof keeps running and holds the claim.
    pub async fn prove_withdrawal(
        &self,
        request: WithdrawalRequest,
    ) -> Result<ProofBundle, ServiceError> {
        let nullifier_hash = derive_nullifier_hash(&self.hasher, request.nullifier);
        let guard = match InFlightGuard::claim(&self.in_flight, nullifier_hash) {
            Some(guard) => guard,
            None => {
                let hash = to_decimal_string(&nullifier_hash);
                warn!(nullifier_hash = %hash, "rejected duplicate withdrawal request");
                return Err(ServiceError::DuplicateNullifier(hash));
            }
        };

        info!(
            leaves = request.leaves.len(),
            depth = self.depth,
            "starting withdrawal proof"
        );

        let backend = self.backend.clone();
        let hasher = self.hasher.clone();
        let depth = self.depth;
        let bundle = tokio::task::spawn_blocking(move || -> Result<ProofBundle, ProveError> {
            let _guard = guard;
            let witness = assemble_witness(
                &hasher,
                request.nullifier,
                request.secret,
                request.recipient,
                &request.leaves,
                depth,
            )?;
            backend.prove(&witness)
        })
        .await??;

        debug!(proof_bytes = bundle.proof.len(), "withdrawal proof ready");
        Ok(bundle)
    }
}
