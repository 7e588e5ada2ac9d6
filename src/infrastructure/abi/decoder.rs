//! ABI decoder implementation using alloy-dyn-abi

use std::sync::Arc;

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_json_abi::JsonAbi;
use anyhow::{bail, Context, Result};

use crate::domain::abi::{
    AbiDecoder, AbiRegistry, DecodeSource, FunctionSignature, MatchedCall, ParamSpec,
};
use crate::domain::calldata;

/// ABI decoder implementation using alloy-dyn-abi
#[derive(Debug, Clone, Default)]
pub struct AlloyAbiDecoder {
    registry: Arc<AbiRegistry>,
}

impl AlloyAbiDecoder {
    /// Create a new decoder with the given registry
    pub fn new(registry: AbiRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn from_json_abi(abi: &JsonAbi) -> Self {
        Self::new(AbiRegistry::from_json_abi(abi))
    }
}

impl AbiDecoder for AlloyAbiDecoder {
    fn decode_calldata(
        &self,
        function: &FunctionSignature,
        data: &[u8],
    ) -> Result<Vec<DynSolValue>> {
        let Some(selector) = calldata::selector(data) else {
            bail!("calldata too short (need at least 4 bytes for selector)");
        };

        // Verify selector matches
        if selector != function.selector {
            bail!(
                "selector mismatch: got 0x{}, expected 0x{}",
                hex::encode(selector),
                hex::encode(function.selector)
            );
        }

        let args_data = &data[4..];

        if function.inputs.is_empty() {
            if !args_data.is_empty() {
                bail!(
                    "function {} has no parameters but calldata has {} extra bytes",
                    function.signature,
                    args_data.len()
                );
            }
            return Ok(Vec::new());
        }

        let types = function
            .inputs
            .iter()
            .map(ParamSpec::resolve)
            .collect::<Result<Vec<_>>>()?;

        decode_params(types, args_data).context("Failed to decode calldata")
    }

    fn decode_by_selector(
        &self,
        data: &[u8],
        source: DecodeSource,
    ) -> Result<Option<MatchedCall>> {
        let Some(selector) = calldata::selector(data) else {
            return Ok(None);
        };
        match self.registry.lookup(selector) {
            Some(function) => {
                let values = self.decode_calldata(function, data)?;
                Ok(Some(MatchedCall::from_function(function, values, source)))
            }
            None => Ok(None),
        }
    }
}

/// Decode a sequence of parameters encoded back to back (no selector)
pub fn decode_params(types: Vec<DynSolType>, data: &[u8]) -> Result<Vec<DynSolValue>> {
    let count = types.len();
    let decoded = DynSolType::Tuple(types)
        .abi_decode_params(data)
        .context("ABI decoding failed")?;

    match decoded {
        DynSolValue::Tuple(values) if values.len() == count => Ok(values),
        other => bail!("expected a {}-tuple, decoded {:?}", count, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_json_abi::Function;

    fn make_transfer_function() -> FunctionSignature {
        FunctionSignature {
            selector: [0xa9, 0x05, 0x9c, 0xbb],
            name: "transfer".to_string(),
            signature: "transfer(address,uint256)".to_string(),
            inputs: vec![ParamSpec::new("to", "address"), ParamSpec::new("amount", "uint256")],
        }
    }

    #[test]
    fn test_decode_transfer() {
        let function = make_transfer_function();

        // transfer(0x1234567890123456789012345678901234567890, 1000)
        let calldata = hex::decode(
            "a9059cbb000000000000000000000000123456789012345678901234567890123456789000000000000000000000000000000000000000000000000000000000000003e8"
        ).unwrap();

        let mut registry = AbiRegistry::new();
        registry.insert(function.clone());
        let decoder = AlloyAbiDecoder::new(registry);

        let values = decoder.decode_calldata(&function, &calldata).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[1], DynSolValue::Uint(alloy_primitives::U256::from(1000), 256));

        let matched = decoder
            .decode_by_selector(&calldata, DecodeSource::ExplicitAbi)
            .unwrap()
            .unwrap();
        assert_eq!(matched.function_name, "transfer");
        assert_eq!(matched.inputs[0].name, "to");
        assert_eq!(matched.source, DecodeSource::ExplicitAbi);
    }

    #[test]
    fn test_selector_mismatch() {
        let function = make_transfer_function();

        // Wrong selector
        let calldata = hex::decode("deadbeef").unwrap();

        let decoder = AlloyAbiDecoder::default();

        let result = decoder.decode_calldata(&function, &calldata);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("selector mismatch"));
    }

    #[test]
    fn test_no_params_rejects_extra_bytes() {
        let function = FunctionSignature::parse("totalSupply()").unwrap();
        let decoder = AlloyAbiDecoder::default();

        assert!(decoder.decode_calldata(&function, &function.selector).unwrap().is_empty());

        let mut extra = function.selector.to_vec();
        extra.extend_from_slice(&[0u8; 32]);
        assert!(decoder.decode_calldata(&function, &extra).is_err());
    }

    #[test]
    fn test_decode_dynamic_bytes() {
        let function = Function::parse("test(bytes)").unwrap();
        let signature = FunctionSignature::from_json_function(&function);
        let mut calldata = signature.selector.to_vec();
        calldata.extend(DynSolValue::Tuple(vec![DynSolValue::Bytes(vec![0x0a, 0xab, 0xbc, 0xc0])]).abi_encode_params());

        let values = AlloyAbiDecoder::default()
            .decode_calldata(&signature, &calldata)
            .unwrap();
        assert_eq!(values, vec![DynSolValue::Bytes(vec![0x0a, 0xab, 0xbc, 0xc0])]);
    }

    #[test]
    fn test_unknown_selector() {
        let decoder = AlloyAbiDecoder::default();
        let result = decoder
            .decode_by_selector(&[0xde, 0xad, 0xbe, 0xef], DecodeSource::ExplicitAbi)
            .unwrap();
        assert!(result.is_none());
    }
}
