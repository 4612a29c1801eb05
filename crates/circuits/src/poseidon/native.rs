//! Native Poseidon hashing (outside circuits).

use std::fmt;
use std::sync::Arc;

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::{PoseidonConfig, PoseidonSponge};
use ark_crypto_primitives::sponge::CryptographicSponge;

use super::config::{poseidon_config, POSEIDON_PARAMS_VERSION};
use crate::hasher::FieldHasher;

/// Sponge with the input count written into the capacity lane, so inputs
/// of different arity never share a starting state.
fn domain_separated_sponge(config: &PoseidonConfig<Fr>, arity: usize) -> PoseidonSponge<Fr> {
    let mut sponge = PoseidonSponge::new(config);
    sponge.state[0] = Fr::from(arity as u64);
    sponge
}

/// Hash a single field element.
pub fn poseidon_hash(config: &PoseidonConfig<Fr>, input: Fr) -> Fr {
    let mut sponge = domain_separated_sponge(config, 1);
    sponge.absorb(&input);
    sponge.squeeze_field_elements(1)[0]
}

/// Hash two field elements, in order.
pub fn poseidon_hash_two(config: &PoseidonConfig<Fr>, a: Fr, b: Fr) -> Fr {
    let mut sponge = domain_separated_sponge(config, 2);
    sponge.absorb(&a);
    sponge.absorb(&b);
    sponge.squeeze_field_elements(1)[0]
}

/// The production [`FieldHasher`].
///
/// Holds the parameter set behind an `Arc`, so clones are cheap and the
/// round constants are generated once per hasher rather than once per hash.
#[derive(Clone)]
pub struct PoseidonHasher {
    config: Arc<PoseidonConfig<Fr>>,
}

impl PoseidonHasher {
    pub fn new() -> Self {
        Self {
            config: Arc::new(poseidon_config()),
        }
    }

    pub fn config(&self) -> &PoseidonConfig<Fr> {
        &self.config
    }

    /// Shared handle to the parameters, for building circuits.
    pub fn shared_config(&self) -> Arc<PoseidonConfig<Fr>> {
        self.config.clone()
    }
}

impl Default for PoseidonHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PoseidonHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoseidonHasher")
            .field("params", &POSEIDON_PARAMS_VERSION)
            .finish()
    }
}

impl FieldHasher for PoseidonHasher {
    fn hash_one(&self, input: Fr) -> Fr {
        poseidon_hash(&self.config, input)
    }

    fn hash_two(&self, left: Fr, right: Fr) -> Fr {
        poseidon_hash_two(&self.config, left, right)
    }
}
