//! Resolver contracts consumed by the engine
//!
//! Both lookups are fallible network boundaries. The engine treats any
//! error as "no candidate" and moves on; it never retries or caches.

use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use async_trait::async_trait;

/// Looks up human-readable signatures for a 4-byte selector
#[async_trait]
pub trait SignatureResolver: Send + Sync {
    /// Candidate signatures, most plausible first. Empty if unknown.
    async fn resolve_selector(&self, selector: [u8; 4]) -> anyhow::Result<Vec<String>>;
}

/// Looks up the ABI published for a deployed contract
#[async_trait]
pub trait AbiSource: Send + Sync {
    async fn resolve_abi(&self, address: Address, chain_id: u64) -> anyhow::Result<ResolvedAbi>;
}

/// Contract ABI with proxy metadata
#[derive(Debug, Clone, Default)]
pub struct ResolvedAbi {
    pub abi: JsonAbi,
    pub is_proxy: bool,
    pub implementation: Option<Address>,
}

impl ResolvedAbi {
    pub fn new(abi: JsonAbi) -> Self {
        Self {
            abi,
            is_proxy: false,
            implementation: None,
        }
    }

    pub fn proxy(abi: JsonAbi, implementation: Address) -> Self {
        Self {
            abi,
            is_proxy: true,
            implementation: Some(implementation),
        }
    }

    /// True when the ABI declares no callable functions
    pub fn is_empty(&self) -> bool {
        self.abi.functions().next().is_none()
    }
}
