//! Decoder entry point
//!
//! Picks an entry path from the context (explicit ABI, contract lookup or
//! nothing), runs the strategy cascade when needed and hands the match to
//! the recursive value decoder. Nothing below this layer escapes as an
//! error: a payload that cannot be explained decodes to `None`.

use std::sync::Arc;

use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use tracing::{debug, warn};

use super::context::{DecodeContext, Target};
use super::strategy::CASCADE;
use crate::domain::abi::{
    AbiDecoder, AbiSource, DecodeSource, DecodedCall, MatchedCall, SignatureResolver,
};
use crate::domain::calldata;
use crate::infrastructure::abi::{AlloyAbiDecoder, NoAbiSource, NoSignatures};

/// Nested `bytes` deeper than this are left undecoded
pub const DEFAULT_MAX_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    pub max_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// The calldata decoding engine
#[derive(Clone)]
pub struct Decoder {
    signatures: Arc<dyn SignatureResolver>,
    abis: Arc<dyn AbiSource>,
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(signatures: Arc<dyn SignatureResolver>, abis: Arc<dyn AbiSource>) -> Self {
        Self {
            signatures,
            abis,
            config: DecoderConfig::default(),
        }
    }

    /// A decoder with no remote lookups at all
    pub fn offline() -> Self {
        Self::new(Arc::new(NoSignatures), Arc::new(NoAbiSource))
    }

    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> DecoderConfig {
        self.config
    }

    /// Decode a payload. `None` means no strategy could explain it.
    pub async fn decode(&self, data: &[u8], ctx: &DecodeContext) -> Option<DecodedCall> {
        if data.is_empty() {
            return None;
        }

        let matched = match ctx.target() {
            Target::Abi(decoder) => match_abi(decoder, data, DecodeSource::ExplicitAbi)?,
            Target::Contract { address, chain_id } => {
                match self.match_contract(data, *address, *chain_id).await {
                    Some(matched) => matched,
                    None => self.run_cascade(data, ctx).await?,
                }
            }
            Target::Unknown => self.run_cascade(data, ctx).await?,
        };

        debug!(
            source = %matched.source,
            signature = %matched.signature,
            depth = ctx.depth(),
            "payload matched"
        );
        Some(self.expand_call(matched, ctx).await)
    }

    /// Decode a hex string; malformed hex decodes to `None`
    pub async fn decode_hex(&self, input: &str, ctx: &DecodeContext) -> Option<DecodedCall> {
        match calldata::parse_hex(input) {
            Ok(data) => self.decode(&data, ctx).await,
            Err(err) => {
                debug!(%err, "input is not hex");
                None
            }
        }
    }

    async fn run_cascade(&self, data: &[u8], ctx: &DecodeContext) -> Option<MatchedCall> {
        for strategy in CASCADE {
            match strategy
                .attempt(data, ctx.depth(), self.signatures.as_ref())
                .await
            {
                Ok(matched) => return Some(matched),
                Err(err) => debug!(?strategy, depth = ctx.depth(), %err, "strategy rejected payload"),
            }
        }
        debug!(len = data.len(), depth = ctx.depth(), "no strategy matched");
        None
    }

    async fn match_contract(
        &self,
        data: &[u8],
        address: Address,
        chain_id: u64,
    ) -> Option<MatchedCall> {
        let abi = self.contract_abi(address, chain_id).await?;
        match_abi(
            &AlloyAbiDecoder::from_json_abi(&abi),
            data,
            DecodeSource::ContractAbi,
        )
    }

    /// Fetch a contract ABI, preferring the implementation behind a proxy
    async fn contract_abi(&self, address: Address, chain_id: u64) -> Option<JsonAbi> {
        let resolved = match self.abis.resolve_abi(address, chain_id).await {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(%address, chain_id, "ABI lookup failed: {err:#}");
                return None;
            }
        };

        if let (true, Some(implementation)) = (resolved.is_proxy, resolved.implementation) {
            match self.abis.resolve_abi(implementation, chain_id).await {
                Ok(target) if !target.is_empty() => return Some(target.abi),
                Ok(_) => debug!(%implementation, "implementation ABI is empty, using proxy ABI"),
                Err(err) => {
                    debug!(%implementation, "implementation ABI lookup failed, using proxy ABI: {err:#}")
                }
            }
        }

        Some(resolved.abi)
    }
}

fn match_abi(decoder: &AlloyAbiDecoder, data: &[u8], source: DecodeSource) -> Option<MatchedCall> {
    match decoder.decode_by_selector(data, source) {
        Ok(Some(matched)) => Some(matched),
        Ok(None) => {
            debug!(%source, "selector not in ABI");
            None
        }
        Err(err) => {
            debug!(%source, "ABI decoding failed: {err:#}");
            None
        }
    }
}
