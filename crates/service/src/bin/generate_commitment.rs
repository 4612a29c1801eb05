//! Create a new deposit.
//!
//! Prints the ABI-encoded `(commitment, nullifier, secret)` tuple as hex.
//! The nullifier and secret are not stored anywhere; keep the output.

use std::process::ExitCode;

use ark_std::rand::{rngs::StdRng, SeedableRng};

use mixer_circuits::PoseidonHasher;
use mixer_service::cli::{finish, generate_commitment, CliError};
use mixer_service::{init_tracing, Config};

fn run() -> Result<String, CliError> {
    let config = Config::from_env()?;
    init_tracing(&config.log_filter);

    let hasher = PoseidonHasher::new();
    let mut rng = StdRng::from_entropy();
    Ok(generate_commitment(&mut rng, &hasher))
}

fn main() -> ExitCode {
    finish(run())
}
