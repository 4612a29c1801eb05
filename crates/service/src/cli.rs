//! Shared plumbing for the `generate-commitment` and `generate-proof`
//! binaries.
//!
//! Both print a single `0x`-prefixed hex line on stdout when they succeed.
//! On failure they print the error on stderr, write nothing to stdout and
//! exit with status 1.

use std::process::ExitCode;

use ark_bn254::Fr;
use ark_std::rand::{CryptoRng, Rng};
use thiserror::Error;

use mixer_circuits::{parse_field_element, DepositNote, FieldError, FieldHasher};
use mixer_prover::{assemble_witness, encode_deposit, ProveError, SetupError};

use crate::config::ConfigError;
use crate::service::{ServiceError, WithdrawalRequest};

pub const GENERATE_PROOF_USAGE: &str =
    "usage: generate-proof <nullifier> <secret> <recipient> [leaf ...]";

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Usage(&'static str),
    #[error("invalid {name}: {source}")]
    Argument {
        name: String,
        #[source]
        source: FieldError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Prove(#[from] ProveError),
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("key setup worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Print the result line or the error, and pick the exit status.
pub fn finish(result: Result<String, CliError>) -> ExitCode {
    match result {
        Ok(line) => {
            println!("{}", line);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sample a deposit and return its ABI encoding as hex.
pub fn generate_commitment<R, H>(rng: &mut R, hasher: &H) -> String
where
    R: Rng + CryptoRng,
    H: FieldHasher,
{
    let note = DepositNote::generate(rng, hasher);
    to_hex(&encode_deposit(&note))
}

fn parse_arg(name: &str, value: &str) -> Result<Fr, CliError> {
    parse_field_element(value).map_err(|source| CliError::Argument {
        name: name.to_string(),
        source,
    })
}

/// Parse `<nullifier> <secret> <recipient> [leaf ...]`.
///
/// Each value is a decimal or `0x`-prefixed hex field element.
pub fn parse_withdraw_args(args: &[String]) -> Result<WithdrawalRequest, CliError> {
    let [nullifier, secret, recipient, leaves @ ..] = args else {
        return Err(CliError::Usage(GENERATE_PROOF_USAGE));
    };

    let leaves = leaves
        .iter()
        .enumerate()
        .map(|(i, leaf)| parse_arg(&format!("leaf {}", i), leaf))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WithdrawalRequest {
        nullifier: parse_arg("nullifier", nullifier)?,
        secret: parse_arg("secret", secret)?,
        recipient: parse_arg("recipient", recipient)?,
        leaves,
    })
}

/// Assemble the witness once without proving, so a missing commitment or an
/// oversized pool is reported before keys are loaded or generated.
pub fn check_withdrawal<H: FieldHasher>(
    hasher: &H,
    request: &WithdrawalRequest,
    depth: usize,
) -> Result<(), CliError> {
    assemble_witness(
        hasher,
        request.nullifier,
        request.secret,
        request.recipient,
        &request.leaves,
        depth,
    )?;
    Ok(())
}
