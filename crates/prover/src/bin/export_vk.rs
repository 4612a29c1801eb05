//! Export the withdraw verifying key for contract deployment.
//!
//! Usage: `export-vk [depth] [keys_dir]`
//!
//! Loads the keys for `depth` (default 20) from `keys_dir` (default `keys`),
//! running setup first if they are missing, and prints the compressed
//! verifying key as hex. The same data is written to `verifying_key.json`.

use std::path::PathBuf;

use mixer_circuits::{DEFAULT_DEPTH, POSEIDON_PARAMS_VERSION};
use mixer_prover::setup::load_or_setup;

fn main() {
    let mut args = std::env::args().skip(1);
    let depth = args
        .next()
        .map(|d| d.parse::<usize>().expect("depth must be a non-negative integer"))
        .unwrap_or(DEFAULT_DEPTH);
    let keys_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("keys"));

    println!("Loading or generating withdraw keys (depth {})...", depth);
    let keys = load_or_setup(&keys_dir, depth).expect("Failed to load or set up keys");

    let vk_bytes = keys.serialize_vk().expect("Failed to serialize verifying key");
    let vk_hex = hex::encode(&vk_bytes);

    println!("\n=== Withdraw Verifying Key ===\n");
    println!("Depth: {}", depth);
    println!("Hash parameters: {}", POSEIDON_PARAMS_VERSION);
    println!("Public inputs: root, nullifier_hash, recipient");
    println!("Size: {} bytes", vk_bytes.len());
    println!("Hex: 0x{}", vk_hex);

    let json = serde_json::json!({
        "depth": depth,
        "hash_params": POSEIDON_PARAMS_VERSION,
        "public_inputs": ["root", "nullifier_hash", "recipient"],
        "verifying_key": format!("0x{}", vk_hex),
    });

    let json_str = serde_json::to_string_pretty(&json).expect("Failed to serialize JSON");
    std::fs::write("verifying_key.json", &json_str).expect("Failed to write JSON file");
    println!("\nVerifying key written to verifying_key.json");
}
