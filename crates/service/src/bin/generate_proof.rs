//! Prove a withdrawal.
//!
//! Usage: `generate-proof <nullifier> <secret> <recipient> [leaf ...]`
//!
//! The leaves are every deposit commitment in the pool, in deposit order.
//! Prints the ABI-encoded `(bytes proof, bytes32[] publicInputs)` tuple as
//! hex. Keys are read from `MIXER_KEYS_DIR` and generated there on first
//! use for `MIXER_TREE_DEPTH`.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::info;

use mixer_circuits::PoseidonHasher;
use mixer_prover::{encode_proof_bundle, load_or_setup, Groth16Backend};
use mixer_service::cli::{check_withdrawal, finish, parse_withdraw_args, to_hex, CliError};
use mixer_service::{init_tracing, Config, ProofService};

async fn run() -> Result<String, CliError> {
    let config = Config::from_env()?;
    init_tracing(&config.log_filter);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let request = parse_withdraw_args(&args)?;

    let hasher = PoseidonHasher::new();
    check_withdrawal(&hasher, &request, config.tree_depth)?;

    let keys_dir = config.keys_dir.clone();
    let depth = config.tree_depth;
    let keys = tokio::task::spawn_blocking(move || load_or_setup(&keys_dir, depth)).await??;

    let backend = Groth16Backend::new(keys, &hasher);
    let service = ProofService::new(Arc::new(backend), hasher, depth);

    let bundle = service.prove_withdrawal(request).await?;
    info!(proof_bytes = bundle.proof.len(), "withdrawal proof generated");

    Ok(to_hex(&encode_proof_bundle(&bundle)))
}

#[tokio::main]
async fn main() -> ExitCode {
    finish(run().await)
}
