//! Ordered strategy cascade

use tracing::{debug, warn};

use super::recognizers::{
    commands, execute, guess, match_signature, multisend, swap_path, text, RecognizeError,
};
use crate::domain::abi::{DecodeSource, MatchedCall, SignatureResolver};
use crate::domain::calldata;

/// One hypothesis about what a payload is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    BatchedExecute,
    SelectorRegistry,
    MultiSend,
    SwapPath,
    AbiEncodedGuess,
    RouterCommands,
    FragmentGuess,
    Utf8Text,
}

/// Strategies in priority order; the first match wins
pub const CASCADE: [Strategy; 8] = [
    Strategy::BatchedExecute,
    Strategy::SelectorRegistry,
    Strategy::MultiSend,
    Strategy::SwapPath,
    Strategy::AbiEncodedGuess,
    Strategy::RouterCommands,
    Strategy::FragmentGuess,
    Strategy::Utf8Text,
];

impl Strategy {
    pub fn source(self) -> DecodeSource {
        match self {
            Self::BatchedExecute => DecodeSource::BatchedExecute,
            Self::SelectorRegistry => DecodeSource::SelectorRegistry,
            Self::MultiSend => DecodeSource::MultiSend,
            Self::SwapPath => DecodeSource::SwapPath,
            Self::AbiEncodedGuess => DecodeSource::AbiEncodedGuess,
            Self::RouterCommands => DecodeSource::RouterCommands,
            Self::FragmentGuess => DecodeSource::FragmentGuess,
            Self::Utf8Text => DecodeSource::Utf8Text,
        }
    }

    /// Run this strategy against a payload. Only the selector registry suspends.
    pub async fn attempt(
        self,
        data: &[u8],
        depth: usize,
        resolver: &dyn SignatureResolver,
    ) -> Result<MatchedCall, RecognizeError> {
        if data.is_empty() {
            return Err(RecognizeError::Empty);
        }
        match self {
            Self::BatchedExecute => execute::recognize(data),
            Self::SelectorRegistry => lookup_selector(data, depth, resolver).await,
            Self::MultiSend => multisend::recognize(data),
            Self::SwapPath => swap_path::recognize(data),
            Self::AbiEncodedGuess => guess::recognize_encoded(data),
            Self::RouterCommands => commands::recognize(data),
            Self::FragmentGuess => guess::recognize_fragment(data),
            Self::Utf8Text => text::recognize(data),
        }
    }
}

/// Decode against the first registry candidate that fits.
/// Never consulted below the top level.
async fn lookup_selector(
    data: &[u8],
    depth: usize,
    resolver: &dyn SignatureResolver,
) -> Result<MatchedCall, RecognizeError> {
    if depth > 0 {
        return Err(RecognizeError::DepthGated(depth));
    }
    let selector = calldata::selector(data).ok_or(RecognizeError::Length {
        actual: data.len(),
        expected: "4-byte selector",
    })?;
    if calldata::is_zero_selector(selector) {
        return Err(RecognizeError::ZeroSelector);
    }

    let candidates = match resolver.resolve_selector(selector).await {
        Ok(candidates) => candidates,
        Err(err) => {
            warn!(selector = %calldata::to_hex(&selector), "signature lookup failed: {err:#}");
            Vec::new()
        }
    };

    for candidate in &candidates {
        match match_signature(candidate, data, DecodeSource::SelectorRegistry) {
            Ok(matched) => return Ok(matched),
            Err(err) => debug!(%candidate, %err, "candidate signature rejected"),
        }
    }
    Err(RecognizeError::NoCandidate(selector))
}
