//! Poseidon parameters for BN254.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_ff::{Field, MontFp, PrimeField};

/// Identifies the parameter set. Commitments, roots and circuit keys are
/// only meaningful against the version that produced them.
pub const POSEIDON_PARAMS_VERSION: &str = "mixer-poseidon-bn254-t3-f8-p57-v2";

/// Number of full rounds (beginning + end)
const FULL_ROUNDS: usize = 8;

/// Number of partial rounds
const PARTIAL_ROUNDS: usize = 57;

/// S-box exponent
const ALPHA: u64 = 5;

const RATE: usize = 2;
const CAPACITY: usize = 1;
const WIDTH: usize = RATE + CAPACITY;

/// Build the Poseidon configuration used by every hash in the mixer.
///
/// - Rate: 2 (a tree node absorbs both children in one permutation)
/// - Capacity: 1
/// - Full rounds: 8 (4 at start, 4 at end)
/// - Partial rounds: 57
/// - Alpha: 5 (x^5 S-box)
///
/// Building the round constants is not free; callers should build once and
/// share the result (see [`PoseidonHasher`](super::PoseidonHasher)).
pub fn poseidon_config() -> PoseidonConfig<Fr> {
    // 3x3 MDS matrix
    let mds = vec![
        vec![
            MontFp!("7511745149465107256748700652201246547602992235352608707588321460060273774987"),
            MontFp!("10370080108974718697676803824769673834027675643658433702224577712625900127200"),
            MontFp!("19705173408229649878903981084052839426532978878058043055305024233888854471533"),
        ],
        vec![
            MontFp!("18732019378264290557468133440468564866454307626475683536618613112504878618481"),
            MontFp!("20870176810702568768751421378473869562658540583882454726129544628203806653987"),
            MontFp!("7266061498423634438932006217945904744987532209093972706694887950396501989428"),
        ],
        vec![
            MontFp!("9131299761947733513298312097611845208338517739621853568979632113419485819303"),
            MontFp!("10595341252162738537912664445405114076324478519622938027420701542910180337937"),
            MontFp!("11597556804922396090267472882856054602429588299176362916247939723151043581408"),
        ],
    ];

    PoseidonConfig::new(
        FULL_ROUNDS,
        PARTIAL_ROUNDS,
        ALPHA,
        mds,
        round_constants(),
        RATE,
        CAPACITY,
    )
}

/// Round constants derived from the version tag.
///
/// Each constant is the next step of `x -> x^5 + counter`, seeded with the
/// big-endian reduction of [`POSEIDON_PARAMS_VERSION`].
fn round_constants() -> Vec<Vec<Fr>> {
    let mut state = Fr::from_be_bytes_mod_order(POSEIDON_PARAMS_VERSION.as_bytes());
    let mut counter = 0u64;

    let mut ark = Vec::with_capacity(FULL_ROUNDS + PARTIAL_ROUNDS);
    for _ in 0..FULL_ROUNDS + PARTIAL_ROUNDS {
        let mut round = Vec::with_capacity(WIDTH);
        for _ in 0..WIDTH {
            counter += 1;
            state = state.pow([ALPHA]) + Fr::from(counter);
            round.push(state);
        }
        ark.push(round);
    }

    ark
}
