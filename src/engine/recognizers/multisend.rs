//! Packed multi-send payloads
//!
//! Layout, repeated until the payload is consumed:
//! `operation (1) | to (20) | value (32) | dataLength (32) | data (dataLength)`

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, U256};

use super::RecognizeError;
use crate::domain::abi::{DecodeSource, MatchedCall, ParamSpec};
use crate::domain::calldata::{self, WORD};

const OPERATION_CALL: u8 = 0;
const OPERATION_DELEGATECALL: u8 = 1;

/// One unpacked entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSendTx {
    pub operation: u8,
    pub to: Address,
    pub value: U256,
    pub data: Vec<u8>,
}

impl MultiSendTx {
    fn into_value(self) -> DynSolValue {
        DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(self.operation), 8),
            DynSolValue::Address(self.to),
            DynSolValue::Uint(self.value, 256),
            DynSolValue::Bytes(self.data),
        ])
    }
}

fn take<'a>(buf: &'a [u8], cursor: &mut usize, len: usize) -> Result<&'a [u8], RecognizeError> {
    let start = *cursor;
    let end = start.checked_add(len).ok_or(RecognizeError::Truncated(start))?;
    let slice = buf.get(start..end).ok_or(RecognizeError::Truncated(start))?;
    *cursor = end;
    Ok(slice)
}

/// Walk the packed layout. Fails on any short read or unknown operation.
pub fn unpack(data: &[u8]) -> Result<Vec<MultiSendTx>, RecognizeError> {
    if data.is_empty() {
        return Err(RecognizeError::Empty);
    }

    let mut txs = Vec::new();
    let mut cursor = 0;
    while cursor < data.len() {
        let offset = cursor;
        let operation = take(data, &mut cursor, 1)?[0];
        if operation != OPERATION_CALL && operation != OPERATION_DELEGATECALL {
            return Err(RecognizeError::UnknownOperation { operation, offset });
        }
        let to = Address::from_slice(take(data, &mut cursor, 20)?);
        let value = U256::from_be_slice(take(data, &mut cursor, WORD)?);
        let length = calldata::word_as_usize(take(data, &mut cursor, WORD)?)
            .ok_or(RecognizeError::Truncated(cursor))?;
        let inner = take(data, &mut cursor, length)?;

        txs.push(MultiSendTx {
            operation,
            to,
            value,
            data: inner.to_vec(),
        });
    }

    Ok(txs)
}

pub fn recognize(data: &[u8]) -> Result<MatchedCall, RecognizeError> {
    let txs = unpack(data)?;

    let components = vec![
        ParamSpec::new("operation", "uint8"),
        ParamSpec::new("to", "address"),
        ParamSpec::new("value", "uint256"),
        ParamSpec::new("data", "bytes"),
    ];
    let inputs: Vec<ParamSpec> = (0..txs.len())
        .map(|i| ParamSpec::tuple(format!("tx #{i}"), "tuple", components.clone()))
        .collect();
    let types: Vec<String> = inputs.iter().map(ParamSpec::canonical_type).collect();

    Ok(MatchedCall {
        source: DecodeSource::MultiSend,
        function_name: "multiSend".to_string(),
        signature: format!("multiSend({})", types.join(",")),
        selector: None,
        inputs,
        values: txs.into_iter().map(MultiSendTx::into_value).collect(),
    })
}
