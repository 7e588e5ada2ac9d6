//! Single-hop encoded swap path: `tokenIn (20) | fee (uint24) | tokenOut (20)`

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};

use super::RecognizeError;
use crate::domain::abi::{DecodeSource, MatchedCall, ParamSpec};

pub const SWAP_PATH_LEN: usize = 20 + 3 + 20;

pub fn recognize(data: &[u8]) -> Result<MatchedCall, RecognizeError> {
    if data.len() != SWAP_PATH_LEN {
        return Err(RecognizeError::Length {
            actual: data.len(),
            expected: "exactly 43 bytes",
        });
    }

    let token_in = Address::from_slice(&data[..20]);
    let fee = U256::from_be_slice(&data[20..23]);
    let token_out = Address::from_slice(&data[23..]);

    Ok(MatchedCall {
        source: DecodeSource::SwapPath,
        function_name: "swapPath".to_string(),
        signature: "swapPath(address,uint24,address)".to_string(),
        selector: None,
        inputs: vec![
            ParamSpec::new("tokenIn", "address"),
            ParamSpec::new("fee", "uint24"),
            ParamSpec::new("tokenOut", "address"),
        ],
        values: vec![
            DynSolValue::Address(token_in),
            DynSolValue::Uint(fee, 24),
            DynSolValue::Address(token_out),
        ],
    })
}
