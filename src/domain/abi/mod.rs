//! ABI domain models and contracts
//!
//! This module defines the traits and types for ABI decoding,
//! independent of the underlying implementation (alloy-dyn-abi).

mod call;
mod decoder;
mod registry;
mod resolver;

pub use call::{
    format_dyn_sol_value, Argument, BaseTypeClass, DecodeSource, DecodedCall, DecodedValue,
    MatchedCall, Scalar,
};
pub use decoder::AbiDecoder;
pub use registry::{AbiRegistry, FunctionSignature, ParamSpec};
pub use resolver::{AbiSource, ResolvedAbi, SignatureResolver};
