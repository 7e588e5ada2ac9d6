//! Calldata decoding engine
//!
//! Given raw transaction calldata and optional context (an ABI, or a
//! contract address and chain), recover a typed, nested description of the
//! call. See [`Decoder`] for the entry point.

pub mod config;
pub mod domain;
pub mod engine;
pub mod infrastructure;

pub use domain::abi::{Argument, BaseTypeClass, DecodeSource, DecodedCall, DecodedValue, Scalar};
pub use engine::{DecodeContext, Decoder, DecoderConfig};
