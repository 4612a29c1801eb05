//! Trusted setup for the withdraw circuit.
//!
//! Keys are specific to a tree depth and to the Poseidon parameter set, so
//! both are part of the file names and the version tag is stored next to
//! the keys and checked on load.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ark_bn254::{Bn254, Fr};
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_groth16::{Groth16, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::{rngs::StdRng, CryptoRng, RngCore, SeedableRng};
use thiserror::Error;
use tracing::info;

use mixer_circuits::{poseidon_config, WithdrawCircuit, MAX_DEPTH, POSEIDON_PARAMS_VERSION};

/// Errors that can occur during setup
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Circuit setup failed: {0}")]
    CircuitSetup(String),
    #[error("Serialization failed: {0}")]
    Serialization(String),
    #[error("Deserialization failed: {0}")]
    Deserialization(String),
    #[error("Keys in {dir} were generated for {found:?}, expected {expected:?}")]
    ParamsMismatch {
        dir: String,
        found: String,
        expected: String,
    },
    #[error("Tree depth {0} exceeds the maximum of {}", MAX_DEPTH)]
    UnsupportedDepth(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Proving and verifying key of the withdraw circuit at one depth
#[derive(Clone)]
pub struct CircuitKeyPair {
    pub depth: usize,
    pub proving_key: ProvingKey<Bn254>,
    pub verifying_key: VerifyingKey<Bn254>,
}

fn to_bytes<T: CanonicalSerialize>(value: &T) -> Result<Vec<u8>, SetupError> {
    let mut bytes = Vec::with_capacity(value.compressed_size());
    value
        .serialize_compressed(&mut bytes)
        .map_err(|e| SetupError::Serialization(e.to_string()))?;
    Ok(bytes)
}

fn from_bytes<T: CanonicalDeserialize>(bytes: &[u8]) -> Result<T, SetupError> {
    T::deserialize_compressed(bytes).map_err(|e| SetupError::Deserialization(e.to_string()))
}

impl CircuitKeyPair {
    pub fn serialize_pk(&self) -> Result<Vec<u8>, SetupError> {
        to_bytes(&self.proving_key)
    }

    pub fn serialize_vk(&self) -> Result<Vec<u8>, SetupError> {
        to_bytes(&self.verifying_key)
    }

    pub fn deserialize_pk(bytes: &[u8]) -> Result<ProvingKey<Bn254>, SetupError> {
        from_bytes(bytes)
    }

    pub fn deserialize_vk(bytes: &[u8]) -> Result<VerifyingKey<Bn254>, SetupError> {
        from_bytes(bytes)
    }

    /// Save both keys and the parameter tag to a directory
    pub fn save_to_directory(&self, dir: &Path) -> Result<(), SetupError> {
        std::fs::create_dir_all(dir)?;

        let paths = KeyPaths::new(dir, self.depth);
        std::fs::write(&paths.pk, self.serialize_pk()?)?;
        std::fs::write(&paths.vk, self.serialize_vk()?)?;
        std::fs::write(&paths.params, POSEIDON_PARAMS_VERSION)?;

        Ok(())
    }

    /// Load the keys for `depth` from a directory
    pub fn load_from_directory(dir: &Path, depth: usize) -> Result<Self, SetupError> {
        let paths = KeyPaths::new(dir, depth);

        let found = std::fs::read_to_string(&paths.params)?;
        if found.trim() != POSEIDON_PARAMS_VERSION {
            return Err(SetupError::ParamsMismatch {
                dir: dir.display().to_string(),
                found: found.trim().to_string(),
                expected: POSEIDON_PARAMS_VERSION.to_string(),
            });
        }

        Ok(Self {
            depth,
            proving_key: Self::deserialize_pk(&std::fs::read(&paths.pk)?)?,
            verifying_key: Self::deserialize_vk(&std::fs::read(&paths.vk)?)?,
        })
    }
}

struct KeyPaths {
    pk: PathBuf,
    vk: PathBuf,
    params: PathBuf,
}

impl KeyPaths {
    fn new(dir: &Path, depth: usize) -> Self {
        let stem = format!("withdraw_d{}", depth);
        Self {
            pk: dir.join(format!("{}.pk", stem)),
            vk: dir.join(format!("{}.vk", stem)),
            params: dir.join(format!("{}.params", stem)),
        }
    }

    fn exist(&self) -> bool {
        self.pk.exists() && self.vk.exists() && self.params.exists()
    }
}

/// Setup WithdrawCircuit for a tree of the given depth
pub fn setup_withdraw<R: RngCore + CryptoRng>(
    rng: &mut R,
    config: Arc<PoseidonConfig<Fr>>,
    depth: usize,
) -> Result<CircuitKeyPair, SetupError> {
    if depth > MAX_DEPTH {
        return Err(SetupError::UnsupportedDepth(depth));
    }

    let circuit = WithdrawCircuit::empty(config, depth);
    let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(circuit, rng)
        .map_err(|e| SetupError::CircuitSetup(e.to_string()))?;

    Ok(CircuitKeyPair {
        depth,
        proving_key: pk,
        verifying_key: vk,
    })
}

/// Load keys for `depth` from `dir`, running setup and saving them if absent.
pub fn load_or_setup(dir: &Path, depth: usize) -> Result<CircuitKeyPair, SetupError> {
    if KeyPaths::new(dir, depth).exist() {
        info!(dir = %dir.display(), depth, "loading withdraw circuit keys");
        return CircuitKeyPair::load_from_directory(dir, depth);
    }

    info!(depth, "running withdraw circuit setup (this may take a while)");
    let mut rng = StdRng::from_entropy();
    let keys = setup_withdraw(&mut rng, Arc::new(poseidon_config()), depth)?;
    keys.save_to_directory(dir)?;
    info!(dir = %dir.display(), "withdraw circuit keys saved");

    Ok(keys)
}
