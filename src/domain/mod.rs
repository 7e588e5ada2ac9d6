//! Domain layer - pure types and contracts
//!
//! This layer contains:
//! - Byte and selector primitives
//! - ABI registry, decoded call tree and resolver traits

pub mod abi;
pub mod calldata;
