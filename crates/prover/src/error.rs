//! Errors surfaced by witness assembly, proving and the ABI codecs.

use thiserror::Error;

use mixer_circuits::{FieldError, TreeError};

/// Errors during proof generation
///
/// Field and tree failures are forwarded unchanged so callers can match on
/// the original variant.
#[derive(Error, Debug)]
pub enum ProveError {
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("Proving backend failed: {0}")]
    Backend(String),
    #[error("ABI encoding failed: {0}")]
    Encoding(String),
    #[error("Serialization failed: {0}")]
    Serialization(String),
}
