//! Byte and selector primitives shared by every decoding strategy

use alloy_primitives::U256;
use thiserror::Error;

/// Size of one ABI word in bytes
pub const WORD: usize = 32;

/// Errors raised while parsing raw user input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalldataError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("empty integer literal")]
    EmptyInteger,

    #[error("invalid digit in integer literal '{0}'")]
    InvalidInteger(String),

    #[error("integer literal '{0}' is out of range")]
    Overflow(String),
}

/// Parse a hex string (with or without 0x prefix) into bytes
pub fn parse_hex(input: &str) -> Result<Vec<u8>, CalldataError> {
    let trimmed = input.trim();
    let payload = strip_hex_prefix(trimmed).unwrap_or(trimmed);
    hex::decode(payload).map_err(|e| CalldataError::InvalidHex(e.to_string()))
}

/// Encode bytes as a 0x-prefixed lowercase hex string
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Extract the leading 4-byte selector, if the payload is long enough
pub fn selector(data: &[u8]) -> Option<[u8; 4]> {
    data.get(..4)?.try_into().ok()
}

pub fn is_zero_selector(selector: [u8; 4]) -> bool {
    selector == [0u8; 4]
}

/// Parse an unsigned integer literal without any leniency.
///
/// Accepts base-10 digits or a `0x`-prefixed hex literal. Signs, inner
/// whitespace, empty digit strings and values above `2^256 - 1` are rejected.
pub fn parse_u256_strict(input: &str) -> Result<U256, CalldataError> {
    let (digits, radix) = match strip_hex_prefix(input) {
        Some(hex) => (hex, 16u32),
        None => (input, 10u32),
    };

    if digits.is_empty() {
        return Err(CalldataError::EmptyInteger);
    }
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(CalldataError::InvalidInteger(input.to_string()));
    }

    U256::from_str_radix(digits, radix as u64)
        .map_err(|_| CalldataError::Overflow(input.to_string()))
}

/// Strict parse narrowed to `u64` (chain ids, depths)
pub fn parse_u64_strict(input: &str) -> Result<u64, CalldataError> {
    let value = parse_u256_strict(input)?;
    if value > U256::from(u64::MAX) {
        return Err(CalldataError::Overflow(input.to_string()));
    }
    Ok(value.to::<u64>())
}

/// Iterate over the complete 32-byte words of a payload
pub fn words(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    data.chunks_exact(WORD)
}

/// Read the word at `index`, if the payload holds it
pub fn word_at(data: &[u8], index: usize) -> Option<&[u8]> {
    let start = index.checked_mul(WORD)?;
    data.get(start..start.checked_add(WORD)?)
}

/// Interpret a big-endian word as a `usize`, if it fits
pub fn word_as_usize(word: &[u8]) -> Option<usize> {
    let value = U256::from_be_slice(word);
    if value > U256::from(usize::MAX) {
        return None;
    }
    Some(value.to::<usize>())
}

fn strip_hex_prefix(input: &str) -> Option<&str> {
    input.strip_prefix("0x").or_else(|| input.strip_prefix("0X"))
}
