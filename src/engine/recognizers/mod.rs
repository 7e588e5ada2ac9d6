//! Format recognizers
//!
//! Each recognizer tests one hypothesis about what a payload means. A
//! recognizer either explains the whole payload or fails; there are no
//! partial results.

pub mod commands;
pub mod execute;
pub mod guess;
pub mod multisend;
pub mod swap_path;
pub mod text;

use thiserror::Error;

use crate::domain::abi::{DecodeSource, FunctionSignature, MatchedCall};
use crate::domain::abi::AbiDecoder;
use crate::infrastructure::abi::AlloyAbiDecoder;

/// Why a recognizer rejected a payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognizeError {
    #[error("empty payload")]
    Empty,

    #[error("selector 0x{} does not match", hex::encode(.0))]
    SelectorMismatch([u8; 4]),

    #[error("payload of {actual} bytes does not fit the expected layout ({expected})")]
    Length { actual: usize, expected: &'static str },

    #[error("selector registry is not consulted at depth {0}")]
    DepthGated(usize),

    #[error("zero selector")]
    ZeroSelector,

    #[error("no signature candidate decodes selector 0x{}", hex::encode(.0))]
    NoCandidate([u8; 4]),

    #[error("truncated entry at byte {0}")]
    Truncated(usize),

    #[error("unknown operation {operation} at byte {offset}")]
    UnknownOperation { operation: u8, offset: usize },

    #[error("unknown command byte 0x{byte:02x} at position {position}")]
    UnknownCommand { byte: u8, position: usize },

    #[error("no plausible ABI layout")]
    NoLayout,

    #[error("guessed layout only echoes the input")]
    TrivialEcho,

    #[error("not text: {0}")]
    NotText(&'static str),

    #[error("ABI decoding failed: {0}")]
    Abi(String),
}

impl From<anyhow::Error> for RecognizeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Abi(format!("{err:#}"))
    }
}

/// Decode a payload against one human-readable signature
pub fn match_signature(
    signature: &str,
    data: &[u8],
    source: DecodeSource,
) -> Result<MatchedCall, RecognizeError> {
    let function = FunctionSignature::parse(signature)?;
    let values = AlloyAbiDecoder::default().decode_calldata(&function, data)?;
    Ok(MatchedCall::from_function(&function, values, source))
}
