//! Runtime around the mixer prover.
//!
//! This crate provides:
//! - `Config`: environment configuration
//! - `init_tracing`: stderr logging for the tools
//! - `ProofService`: blocking-pool proof worker with duplicate-nullifier rejection
//! - `cli`: the logic behind `generate-commitment` and `generate-proof`

pub mod cli;
pub mod config;
pub mod service;
pub mod telemetry;

pub use config::{Config, ConfigError};
pub use service::{ProofService, ServiceError, WithdrawalRequest};
pub use telemetry::init_tracing;
