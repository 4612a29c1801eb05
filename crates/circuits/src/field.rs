//! Field element codec for the BN254 scalar field.
//!
//! Every value crossing a process boundary (CLI arguments, ABI words, prover
//! input JSON) goes through this module. Two canonical encodings exist:
//! a 32-byte big-endian buffer and a decimal string. Decoding never reduces
//! modulo the field: values at or above the modulus are rejected.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;
use num_traits::Num;
use thiserror::Error;

/// Canonical field element type used throughout the mixer.
pub type FieldElement = Fr;

/// Width of an encoded field element in bytes.
pub const FIELD_BYTES: usize = 32;

/// Errors raised while decoding field elements.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("invalid field element literal {0:?}")]
    Parse(String),
    #[error("value {0} is not below the BN254 scalar modulus")]
    Range(String),
    #[error("field element must be {} bytes, got {0}", FIELD_BYTES)]
    Length(usize),
}

fn modulus() -> BigUint {
    BigUint::from(Fr::MODULUS)
}

fn from_biguint(value: BigUint) -> Result<Fr, FieldError> {
    if value >= modulus() {
        return Err(FieldError::Range(value.to_string()));
    }
    Ok(Fr::from(value))
}

/// Parse a non-negative decimal literal.
///
/// Only ASCII digits are accepted: no sign, whitespace or digit separators.
/// Leading zeros are allowed and dropped by [`to_decimal_string`].
pub fn from_decimal_str(s: &str) -> Result<Fr, FieldError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FieldError::Parse(s.to_string()));
    }
    let value =
        BigUint::from_str_radix(s, 10).map_err(|_| FieldError::Parse(s.to_string()))?;
    from_biguint(value)
}

/// Canonical decimal representation (no leading zeros).
pub fn to_decimal_string(e: &Fr) -> String {
    BigUint::from(e.into_bigint()).to_string()
}

/// Encode as a 32-byte big-endian buffer.
pub fn to_bytes32(e: &Fr) -> [u8; FIELD_BYTES] {
    let bytes = e.into_bigint().to_bytes_be();
    let mut out = [0u8; FIELD_BYTES];
    out[FIELD_BYTES - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// Decode a 32-byte big-endian buffer.
pub fn from_bytes32(bytes: &[u8; FIELD_BYTES]) -> Result<Fr, FieldError> {
    from_biguint(BigUint::from_bytes_be(bytes))
}

/// Decode a big-endian slice that must be exactly 32 bytes long.
pub fn from_be_slice(bytes: &[u8]) -> Result<Fr, FieldError> {
    let arr: &[u8; FIELD_BYTES] = bytes
        .try_into()
        .map_err(|_| FieldError::Length(bytes.len()))?;
    from_bytes32(arr)
}

/// Parse a `0x`-prefixed big-endian hex string of at most 32 bytes.
pub fn from_hex_str(s: &str) -> Result<Fr, FieldError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| FieldError::Parse(s.to_string()))?;
    if digits.is_empty() || digits.len() > 2 * FIELD_BYTES {
        return Err(FieldError::Parse(s.to_string()));
    }
    // hex::decode needs an even number of digits
    let padded = if digits.len() % 2 == 1 {
        format!("0{}", digits)
    } else {
        digits.to_string()
    };
    let bytes = hex::decode(padded).map_err(|_| FieldError::Parse(s.to_string()))?;
    from_biguint(BigUint::from_bytes_be(&bytes))
}

/// `0x`-prefixed, zero-padded 32-byte hex representation.
pub fn to_hex_string(e: &Fr) -> String {
    format!("0x{}", hex::encode(to_bytes32(e)))
}

/// Parse either a decimal literal or a `0x`-prefixed hex literal.
pub fn parse_field_element(s: &str) -> Result<Fr, FieldError> {
    if s.starts_with("0x") || s.starts_with("0X") {
        from_hex_str(s)
    } else {
        from_decimal_str(s)
    }
}
