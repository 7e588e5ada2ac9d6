//! Decoded call tree produced by the engine

use std::fmt;

use alloy_dyn_abi::{DynSolType, DynSolValue};
use serde::{Serialize, Serializer};

use super::ParamSpec;

/// Which path produced a decoded call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeSource {
    /// Caller-supplied ABI
    ExplicitAbi,
    /// ABI fetched for the target contract (implementation ABI for proxies)
    ContractAbi,
    BatchedExecute,
    SelectorRegistry,
    MultiSend,
    SwapPath,
    AbiEncodedGuess,
    RouterCommands,
    FragmentGuess,
    Utf8Text,
}

impl fmt::Display for DecodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ExplicitAbi => "explicit ABI",
            Self::ContractAbi => "contract ABI",
            Self::BatchedExecute => "batched execute",
            Self::SelectorRegistry => "selector registry",
            Self::MultiSend => "multi-send",
            Self::SwapPath => "swap path",
            Self::AbiEncodedGuess => "ABI-encoded guess",
            Self::RouterCommands => "router commands",
            Self::FragmentGuess => "function fragment guess",
            Self::Utf8Text => "UTF-8 text",
        };
        f.write_str(label)
    }
}

/// A successful structural match, before argument expansion
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedCall {
    pub source: DecodeSource,
    pub function_name: String,
    pub signature: String,
    pub selector: Option<[u8; 4]>,
    pub inputs: Vec<ParamSpec>,
    pub values: Vec<DynSolValue>,
}

/// Structural category of a declared parameter type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseTypeClass {
    Integer,
    Address,
    Boolean,
    String,
    Bytes,
    Tuple,
    Array,
    Other,
}

impl BaseTypeClass {
    pub fn of(ty: &DynSolType) -> Self {
        match ty {
            DynSolType::Int(_) | DynSolType::Uint(_) => Self::Integer,
            DynSolType::Address => Self::Address,
            DynSolType::Bool => Self::Boolean,
            DynSolType::String => Self::String,
            DynSolType::Bytes | DynSolType::FixedBytes(_) => Self::Bytes,
            DynSolType::Tuple(_) => Self::Tuple,
            DynSolType::Array(_) | DynSolType::FixedArray(..) => Self::Array,
            _ => Self::Other,
        }
    }
}

/// Leaf values, always rendered as strings or booleans
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Base-10 integer
    Integer(String),
    /// Checksummed address
    Address(String),
    Bool(bool),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) | Self::Address(value) => f.write_str(value),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value:?}"),
        }
    }
}

/// Expanded value of one argument
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DecodedValue {
    Scalar(Scalar),
    /// Nested call recovered from a bytes payload, `None` if unrecognized
    Bytes(Option<Box<DecodedCall>>),
    /// `None` when the tuple type declares no components
    Tuple(Option<Vec<Argument>>),
    Array(Vec<Argument>),
    Raw(#[serde(serialize_with = "serialize_raw")] DynSolValue),
}

/// One typed argument of a decoded call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    pub name: String,
    pub declared_type: String,
    pub base_type: BaseTypeClass,
    #[serde(serialize_with = "serialize_raw")]
    pub raw_value: DynSolValue,
    pub value: DecodedValue,
}

/// Result of decoding a function call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedCall {
    /// Function name, or a synthetic label for non-function formats
    pub function_name: String,
    /// Full function signature (e.g., "transfer(address,uint256)")
    pub signature: String,
    #[serde(serialize_with = "serialize_selector")]
    pub selector: Option<[u8; 4]>,
    pub source: DecodeSource,
    #[serde(serialize_with = "serialize_raw_list")]
    pub raw_args: Vec<DynSolValue>,
    pub arguments: Vec<Argument>,
}

impl DecodedCall {
    /// Display label, falling back to the selector when the name was elided
    pub fn label(&self) -> String {
        match (self.function_name.is_empty(), self.selector) {
            (false, _) => self.function_name.clone(),
            (true, Some(selector)) => format!("0x{}", hex::encode(selector)),
            (true, None) => "(anonymous)".to_string(),
        }
    }
}

/// Format a DynSolValue for display
pub fn format_dyn_sol_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::FixedBytes(word, size) => {
            let bytes = &word.as_slice()[..(*size).min(32)];
            format!("0x{}", hex::encode(bytes))
        }
        DynSolValue::Address(addr) => addr.to_string(),
        DynSolValue::Function(func) => format!("0x{}", hex::encode(func.as_slice())),
        DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        DynSolValue::String(s) => format!("\"{}\"", s),
        DynSolValue::Array(arr) | DynSolValue::FixedArray(arr) => {
            let items: Vec<String> = arr.iter().map(format_dyn_sol_value).collect();
            format!("[{}]", items.join(", "))
        }
        DynSolValue::Tuple(fields) => {
            let items: Vec<String> = fields.iter().map(format_dyn_sol_value).collect();
            format!("({})", items.join(", "))
        }
        #[allow(unreachable_patterns)]
        other => format!("{:?}", other),
    }
}

fn serialize_raw<S: Serializer>(value: &DynSolValue, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_dyn_sol_value(value))
}

fn serialize_raw_list<S: Serializer>(
    values: &[DynSolValue],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter().map(format_dyn_sol_value))
}

fn serialize_selector<S: Serializer>(
    selector: &Option<[u8; 4]>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match selector {
        Some(selector) => serializer.serialize_str(&format!("0x{}", hex::encode(selector))),
        None => serializer.serialize_none(),
    }
}
