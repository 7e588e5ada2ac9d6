//! Per-decode context: what the caller knows about the target, and how deep we are

use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;

use crate::infrastructure::abi::AlloyAbiDecoder;

/// What the caller supplied alongside the calldata
#[derive(Debug, Clone, Default)]
pub enum Target {
    /// Nothing known; run the recognizer cascade
    #[default]
    Unknown,
    /// Decode strictly against this ABI
    Abi(AlloyAbiDecoder),
    /// Fetch the ABI for this contract, then fall back to the cascade
    Contract { address: Address, chain_id: u64 },
}

/// Target plus recursion depth. Depth only grows when a nested `bytes`
/// value is decoded; tuple and array members share their parent's depth.
#[derive(Debug, Clone, Default)]
pub struct DecodeContext {
    target: Target,
    depth: usize,
}

impl DecodeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_abi(abi: &JsonAbi) -> Self {
        Self {
            target: Target::Abi(AlloyAbiDecoder::from_json_abi(abi)),
            depth: 0,
        }
    }

    pub fn with_decoder(decoder: AlloyAbiDecoder) -> Self {
        Self {
            target: Target::Abi(decoder),
            depth: 0,
        }
    }

    pub fn with_contract(address: Address, chain_id: u64) -> Self {
        Self {
            target: Target::Contract { address, chain_id },
            depth: 0,
        }
    }

    /// Start at an explicit depth
    pub fn at_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Context for decoding a nested `bytes` payload
    pub fn nested(&self) -> Self {
        Self {
            target: self.target.clone(),
            depth: self.depth + 1,
        }
    }
}
