//! ABI registry - stores function signatures by selector

use std::collections::HashMap;

use alloy_dyn_abi::DynSolType;
use alloy_json_abi::{Function, JsonAbi, Param};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A function parameter specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name (may be empty)
    pub name: String,
    /// Solidity type as declared (e.g., "address", "uint256", "tuple[]")
    pub kind: String,
    /// Tuple components, empty for non-tuple types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ParamSpec>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            components: Vec::new(),
        }
    }

    /// Tuple-typed parameter (`kind` may carry array suffixes, e.g. "tuple[]")
    pub fn tuple(name: impl Into<String>, kind: impl Into<String>, components: Vec<ParamSpec>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            components,
        }
    }

    pub fn from_json_param(param: &Param) -> Self {
        Self {
            name: param.name.clone(),
            kind: param.ty.clone(),
            components: param.components.iter().map(Self::from_json_param).collect(),
        }
    }

    /// Build a spec from a resolved type, naming tuple components positionally
    pub fn from_dyn_type(name: impl Into<String>, ty: &DynSolType) -> Self {
        let (base, suffix) = peel_arrays(ty);
        match base {
            DynSolType::Tuple(members) => Self::tuple(
                name,
                format!("tuple{suffix}"),
                members
                    .iter()
                    .map(|member| Self::from_dyn_type("", member))
                    .collect(),
            ),
            _ => Self::new(name, ty.sol_type_name().into_owned()),
        }
    }

    /// Canonical type string with tuples expanded, e.g. "(address,uint256)[]"
    pub fn canonical_type(&self) -> String {
        match self.kind.strip_prefix("tuple") {
            Some(suffix) => {
                let inner: Vec<String> = self.components.iter().map(Self::canonical_type).collect();
                format!("({}){}", inner.join(","), suffix)
            }
            None => self.kind.clone(),
        }
    }

    /// Resolve into a concrete ABI type
    pub fn resolve(&self) -> Result<DynSolType> {
        let canonical = self.canonical_type();
        DynSolType::parse(&canonical)
            .with_context(|| format!("Failed to parse type '{}' for param '{}'", canonical, self.name))
    }

    /// Spec of a single element when this parameter is an array
    pub fn element(&self) -> Option<Self> {
        if !self.kind.ends_with(']') {
            return None;
        }
        let cut = self.kind.rfind('[')?;
        Some(Self {
            name: String::new(),
            kind: self.kind[..cut].to_string(),
            components: self.components.clone(),
        })
    }
}

/// A function signature with its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// 4-byte function selector
    pub selector: [u8; 4],
    /// Function name
    pub name: String,
    /// Full signature string (e.g., "transfer(address,uint256)")
    pub signature: String,
    /// Input parameters
    pub inputs: Vec<ParamSpec>,
}

impl FunctionSignature {
    pub fn from_json_function(function: &Function) -> Self {
        Self {
            selector: function.selector().0,
            name: function.name.clone(),
            signature: function.signature(),
            inputs: function.inputs.iter().map(ParamSpec::from_json_param).collect(),
        }
    }

    /// Parse a human-readable signature such as "transfer(address,uint256)"
    pub fn parse(signature: &str) -> Result<Self> {
        let function = Function::parse(signature.trim())
            .with_context(|| format!("Invalid signature '{}'", signature))?;
        Ok(Self::from_json_function(&function))
    }

    /// Get selector as hex string
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }
}

/// Registry of function signatures indexed by selector
#[derive(Debug, Default, Clone)]
pub struct AbiRegistry {
    /// Functions indexed by 4-byte selector
    functions: HashMap<[u8; 4], FunctionSignature>,
    /// Number of files scanned
    pub scanned_files: usize,
    /// Scan errors
    pub errors: Vec<String>,
}

impl AbiRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding every function of a JSON ABI
    pub fn from_json_abi(abi: &JsonAbi) -> Self {
        let mut registry = Self::new();
        for function in abi.functions() {
            registry.insert(FunctionSignature::from_json_function(function));
        }
        registry
    }

    /// Insert a function signature
    ///
    /// Note: First function for a given selector wins (no overwrite)
    pub fn insert(&mut self, function: FunctionSignature) {
        self.functions.entry(function.selector).or_insert(function);
    }

    /// Look up a function by selector
    pub fn lookup(&self, selector: [u8; 4]) -> Option<&FunctionSignature> {
        self.functions.get(&selector)
    }

    /// Get the number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Merge another registry into this one
    ///
    /// Functions from the other registry are only added if their
    /// selector is not already present (first wins).
    pub fn merge(&mut self, other: Self) {
        self.scanned_files = self.scanned_files.saturating_add(other.scanned_files);
        self.errors.extend(other.errors);
        for (selector, function) in other.functions {
            self.functions.entry(selector).or_insert(function);
        }
    }
}

/// Split trailing array dimensions off a type, returning the base and its suffix
fn peel_arrays(ty: &DynSolType) -> (&DynSolType, String) {
    match ty {
        DynSolType::Array(inner) => {
            let (base, suffix) = peel_arrays(inner);
            (base, format!("{suffix}[]"))
        }
        DynSolType::FixedArray(inner, len) => {
            let (base, suffix) = peel_arrays(inner);
            (base, format!("{suffix}[{len}]"))
        }
        other => (other, String::new()),
    }
}
