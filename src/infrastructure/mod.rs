//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - ABI decoding using alloy-dyn-abi
//! - OpenChain, 4byte.directory and Sourcify lookups
//! - Local build-artifact scanning

pub mod abi;
