//! UTF-8 text fallback

use alloy_dyn_abi::DynSolValue;

use super::RecognizeError;
use crate::domain::abi::{DecodeSource, MatchedCall, ParamSpec};

/// Minimum share of printable characters, in percent
pub const PRINTABLE_THRESHOLD: usize = 80;

pub(crate) fn is_printable(c: char) -> bool {
    !c.is_control() || matches!(c, '\n' | '\r' | '\t')
}

pub fn recognize(data: &[u8]) -> Result<MatchedCall, RecognizeError> {
    if data.is_empty() {
        return Err(RecognizeError::Empty);
    }
    if data.contains(&0) {
        return Err(RecognizeError::NotText("embedded null byte"));
    }
    let text = std::str::from_utf8(data).map_err(|_| RecognizeError::NotText("invalid UTF-8"))?;

    let total = text.chars().count();
    let printable = text.chars().filter(|c| is_printable(*c)).count();
    if printable * 100 < total * PRINTABLE_THRESHOLD {
        return Err(RecognizeError::NotText("too few printable characters"));
    }

    Ok(MatchedCall {
        source: DecodeSource::Utf8Text,
        function_name: "text".to_string(),
        signature: "text(string)".to_string(),
        selector: None,
        inputs: vec![ParamSpec::new("message", "string")],
        values: vec![DynSolValue::String(text.to_string())],
    })
}
