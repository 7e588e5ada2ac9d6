//! Batched-execute envelope: `execute(bytes32 mode, bytes executionData)`
//! where the execution data is an ABI-encoded `(address,uint256,bytes)[]`.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_sol_types::{sol, SolCall};

use super::RecognizeError;
use crate::domain::abi::{DecodeSource, MatchedCall, ParamSpec};
use crate::domain::calldata;
use crate::infrastructure::abi::decode_params;

sol! {
    function execute(bytes32 mode, bytes executionData);
}

pub const EXECUTE_SELECTOR: [u8; 4] = executeCall::SELECTOR;

/// Components of one inner call
pub fn call_components() -> Vec<ParamSpec> {
    vec![
        ParamSpec::new("to", "address"),
        ParamSpec::new("value", "uint256"),
        ParamSpec::new("data", "bytes"),
    ]
}

pub fn recognize(data: &[u8]) -> Result<MatchedCall, RecognizeError> {
    let selector = calldata::selector(data).ok_or(RecognizeError::Length {
        actual: data.len(),
        expected: "4-byte selector",
    })?;
    if selector != EXECUTE_SELECTOR {
        return Err(RecognizeError::SelectorMismatch(selector));
    }

    let envelope = decode_params(vec![DynSolType::FixedBytes(32), DynSolType::Bytes], &data[4..])?;
    let execution_data = match envelope.get(1) {
        Some(DynSolValue::Bytes(bytes)) => bytes,
        _ => return Err(RecognizeError::Abi("missing execution data".to_string())),
    };

    let call_type = DynSolType::Tuple(vec![
        DynSolType::Address,
        DynSolType::Uint(256),
        DynSolType::Bytes,
    ]);
    let calls = match decode_params(vec![DynSolType::Array(Box::new(call_type))], execution_data)?
        .into_iter()
        .next()
    {
        Some(DynSolValue::Array(calls)) => calls,
        _ => return Err(RecognizeError::Abi("execution data is not a call array".to_string())),
    };

    let inputs = (0..calls.len())
        .map(|i| ParamSpec::tuple(format!("tx #{i}"), "tuple", call_components()))
        .collect();

    Ok(MatchedCall {
        source: DecodeSource::BatchedExecute,
        function_name: "execute".to_string(),
        signature: executeCall::SIGNATURE.to_string(),
        selector: Some(EXECUTE_SELECTOR),
        inputs,
        values: calls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{keccak256, Address, U256};

    fn encode_execute(calls: &[(Address, U256, Vec<u8>)]) -> Vec<u8> {
        let array = DynSolValue::Array(
            calls
                .iter()
                .map(|(to, value, data)| {
                    DynSolValue::Tuple(vec![
                        DynSolValue::Address(*to),
                        DynSolValue::Uint(*value, 256),
                        DynSolValue::Bytes(data.clone()),
                    ])
                })
                .collect(),
        );
        let execution_data = DynSolValue::Tuple(vec![array]).abi_encode_params();
        let mut out = EXECUTE_SELECTOR.to_vec();
        out.extend(
            DynSolValue::Tuple(vec![
                DynSolValue::FixedBytes(Default::default(), 32),
                DynSolValue::Bytes(execution_data),
            ])
            .abi_encode_params(),
        );
        out
    }

    #[test]
    fn test_selector_constant() {
        assert_eq!(EXECUTE_SELECTOR, [0xe9, 0xae, 0x5c, 0x53]);
        assert_eq!(&keccak256("execute(bytes32,bytes)")[..4], &EXECUTE_SELECTOR);
    }

    #[test]
    fn test_recognize_two_calls() {
        let calls = vec![
            (Address::repeat_byte(0x11), U256::from(5), vec![0xde, 0xad]),
            (Address::repeat_byte(0x22), U256::ZERO, Vec::new()),
        ];
        let matched = recognize(&encode_execute(&calls)).unwrap();

        assert_eq!(matched.source, DecodeSource::BatchedExecute);
        assert_eq!(matched.inputs.len(), 2);
        assert_eq!(matched.inputs[1].name, "tx #1");
        assert_eq!(matched.inputs[0].canonical_type(), "(address,uint256,bytes)");
        assert_eq!(
            matched.values[0],
            DynSolValue::Tuple(vec![
                DynSolValue::Address(Address::repeat_byte(0x11)),
                DynSolValue::Uint(U256::from(5), 256),
                DynSolValue::Bytes(vec![0xde, 0xad]),
            ])
        );
    }

    #[test]
    fn test_other_selector_rejected() {
        let data = hex::decode("a9059cbb").unwrap();
        assert_eq!(recognize(&data), Err(RecognizeError::SelectorMismatch([0xa9, 0x05, 0x9c, 0xbb])));
    }

    #[test]
    fn test_garbage_after_selector_rejected() {
        let mut data = EXECUTE_SELECTOR.to_vec();
        data.extend_from_slice(&[0xff; 40]);
        assert!(matches!(recognize(&data), Err(RecognizeError::Abi(_))));
    }
}
