//! ABI decoder trait

use alloy_dyn_abi::DynSolValue;

use super::{DecodeSource, FunctionSignature, MatchedCall};

/// Decodes calldata against known function definitions
pub trait AbiDecoder: Send + Sync {
    /// Decode calldata given a function signature
    ///
    /// # Arguments
    /// * `function` - The function signature to decode with
    /// * `data` - The calldata bytes (including the 4-byte selector)
    ///
    /// # Returns
    /// * `Ok(values)` - One raw value per declared input
    /// * `Err(...)` - If the selector differs or decoding fails
    fn decode_calldata(
        &self,
        function: &FunctionSignature,
        data: &[u8],
    ) -> anyhow::Result<Vec<DynSolValue>>;

    /// Decode calldata by looking up the selector
    ///
    /// # Returns
    /// * `Ok(Some(MatchedCall))` - If the selector was found and decoding succeeded
    /// * `Ok(None)` - If the selector was not found
    /// * `Err(...)` - If decoding fails
    fn decode_by_selector(
        &self,
        data: &[u8],
        source: DecodeSource,
    ) -> anyhow::Result<Option<MatchedCall>>;
}

impl MatchedCall {
    /// Pair a function definition with its decoded input values
    pub fn from_function(
        function: &FunctionSignature,
        values: Vec<DynSolValue>,
        source: DecodeSource,
    ) -> Self {
        Self {
            source,
            function_name: function.name.clone(),
            signature: function.signature.clone(),
            selector: Some(function.selector),
            inputs: function.inputs.clone(),
            values,
        }
    }
}
