//! Layout inference for ABI-encoded data without a known signature
//!
//! Reads the payload as 32-byte words. Head words that look like offsets
//! point at dynamic regions (`bytes`, `string`, arrays, dynamic tuples);
//! everything else is classified as a static word. Every guess is checked
//! by decoding and re-encoding: a layout only counts if it reproduces the
//! input byte for byte.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::U256;

use super::{text::is_printable, RecognizeError};
use crate::domain::abi::{DecodeSource, MatchedCall, ParamSpec};
use crate::domain::calldata::{self, WORD};
use crate::infrastructure::abi::decode_params;

const MAX_NESTING: usize = 4;

/// Guess the parameter types of an ABI-encoded sequence
pub fn infer_types(payload: &[u8]) -> Option<Vec<DynSolType>> {
    if payload.is_empty() || payload.len() % WORD != 0 {
        return None;
    }

    infer_tuple(payload, 0)
        .filter(|types| verifies(types, payload))
        .or_else(|| {
            let types: Vec<DynSolType> = calldata::words(payload).map(static_type).collect();
            verifies(&types, payload).then_some(types)
        })
}

/// Classify a word that is not an offset: left-padded 20-byte values are
/// addresses, right-padded values are `bytes32`, the rest `uint256`
fn static_type(word: &[u8]) -> DynSolType {
    let leading_zeros = word.iter().take_while(|b| **b == 0).count();
    let right_padded = word.first().is_some_and(|b| *b != 0) && word.last() == Some(&0);
    match leading_zeros {
        12 => DynSolType::Address,
        0 if right_padded => DynSolType::FixedBytes(32),
        _ => DynSolType::Uint(256),
    }
}

fn as_offset(word: &[u8], index: usize, len: usize) -> Option<usize> {
    let value = calldata::word_as_usize(word)?;
    let past_word = index.checked_add(1)?.checked_mul(WORD)?;
    (value % WORD == 0 && value >= past_word && value < len).then_some(value)
}

fn infer_tuple(data: &[u8], nesting: usize) -> Option<Vec<DynSolType>> {
    if nesting > MAX_NESTING || data.is_empty() || data.len() % WORD != 0 {
        return None;
    }

    let mut head_end = data.len() / WORD;
    let mut offsets = Vec::new();
    let mut index = 0;
    while index < head_end {
        let word = calldata::word_at(data, index)?;
        if let Some(offset) = as_offset(word, index, data.len()) {
            head_end = head_end.min(offset / WORD);
            offsets.push((index, offset));
        }
        index += 1;
    }

    if let Some((_, first)) = offsets.first() {
        if *first != head_end * WORD {
            return None;
        }
    }
    if offsets.windows(2).any(|pair| pair[0].1 >= pair[1].1) {
        return None;
    }

    let mut types = Vec::with_capacity(head_end);
    let mut pending = offsets.iter().peekable();
    for index in 0..head_end {
        match pending.peek() {
            Some((at, offset)) if *at == index => {
                let start = *offset;
                pending.next();
                let end = pending.peek().map_or(data.len(), |(_, next)| *next);
                types.push(infer_dynamic(&data[start..end], nesting + 1)?);
            }
            _ => types.push(static_type(calldata::word_at(data, index)?)),
        }
    }
    Some(types)
}

/// Infer the type stored in a dynamic region (the tail an offset points at)
fn infer_dynamic(region: &[u8], nesting: usize) -> Option<DynSolType> {
    if nesting > MAX_NESTING || region.len() < WORD || region.len() % WORD != 0 {
        return None;
    }
    let length = calldata::word_as_usize(calldata::word_at(region, 0)?)?;
    let body = &region[WORD..];

    if let Some(ty) = bytes_like(length, body) {
        return Some(ty);
    }

    infer_array(length, body, nesting)
        .filter(|ty| region_verifies(ty, region))
        .or_else(|| {
            infer_tuple(region, nesting)
                .map(DynSolType::Tuple)
                .filter(|ty| region_verifies(ty, region))
        })
}

fn bytes_like(length: usize, body: &[u8]) -> Option<DynSolType> {
    let padded = length.div_ceil(WORD).checked_mul(WORD)?;
    if body.len() != padded || body[length..].iter().any(|b| *b != 0) {
        return None;
    }

    let content = &body[..length];
    let printable = !content.is_empty()
        && !content.contains(&0)
        && std::str::from_utf8(content).is_ok_and(|text| text.chars().all(is_printable));
    Some(if printable {
        DynSolType::String
    } else {
        DynSolType::Bytes
    })
}

fn infer_array(count: usize, body: &[u8], nesting: usize) -> Option<DynSolType> {
    if count == 0 || body.is_empty() {
        return None;
    }
    dynamic_elements(count, body, nesting)
        .or_else(|| static_elements(count, body))
        .map(|element| DynSolType::Array(Box::new(element)))
}

fn dynamic_elements(count: usize, body: &[u8], nesting: usize) -> Option<DynSolType> {
    let head = count.checked_mul(WORD)?;
    let offsets = (0..count)
        .map(|i| calldata::word_at(body, i).and_then(calldata::word_as_usize))
        .collect::<Option<Vec<_>>>()?;

    if offsets.first() != Some(&head)
        || offsets.windows(2).any(|pair| pair[0] >= pair[1])
        || offsets.iter().any(|offset| offset % WORD != 0 || *offset >= body.len())
    {
        return None;
    }

    let mut element: Option<DynSolType> = None;
    for (i, start) in offsets.iter().enumerate() {
        let end = offsets.get(i + 1).copied().unwrap_or(body.len());
        let ty = infer_dynamic(&body[*start..end], nesting + 1)?;
        match &element {
            Some(existing) if *existing != ty => return None,
            Some(_) => {}
            None => element = Some(ty),
        }
    }
    element
}

fn static_elements(count: usize, body: &[u8]) -> Option<DynSolType> {
    let total_words = body.len() / WORD;
    if total_words % count != 0 {
        return None;
    }
    let width = total_words / count;

    let mut slots: Vec<DynSolType> = body[..width * WORD]
        .chunks_exact(WORD)
        .map(static_type)
        .collect();
    for element in body.chunks_exact(width * WORD).skip(1) {
        for (slot, word) in slots.iter_mut().zip(element.chunks_exact(WORD)) {
            if *slot != static_type(word) {
                *slot = DynSolType::Uint(256);
            }
        }
    }

    Some(match slots.len() {
        1 => slots.remove(0),
        _ => DynSolType::Tuple(slots),
    })
}

fn verifies(types: &[DynSolType], data: &[u8]) -> bool {
    decode_params(types.to_vec(), data)
        .map(|values| DynSolValue::Tuple(values).abi_encode_params() == data)
        .unwrap_or(false)
}

/// Check a dynamic region by re-wrapping it as a single-parameter encoding
fn region_verifies(ty: &DynSolType, region: &[u8]) -> bool {
    let mut wrapped = U256::from(WORD).to_be_bytes::<32>().to_vec();
    wrapped.extend_from_slice(region);
    verifies(std::slice::from_ref(ty), &wrapped)
}

fn signature_of(types: &[DynSolType]) -> String {
    let names: Vec<_> = types.iter().map(|ty| ty.sol_type_name()).collect();
    format!("({})", names.join(","))
}

fn guessed_inputs(types: &[DynSolType]) -> Vec<ParamSpec> {
    types
        .iter()
        .enumerate()
        .map(|(i, ty)| ParamSpec::from_dyn_type(format!("param{i}"), ty))
        .collect()
}

fn is_trivial_echo(types: &[DynSolType], values: &[DynSolValue], data: &[u8]) -> bool {
    match (types, values) {
        ([_], _) if data.len() == WORD => true,
        ([DynSolType::Bytes], [DynSolValue::Bytes(bytes)]) => bytes.as_slice() == data,
        _ => false,
    }
}

/// Treat the whole payload as an ABI-encoded parameter sequence
pub fn recognize_encoded(data: &[u8]) -> Result<MatchedCall, RecognizeError> {
    let types = infer_types(data).ok_or(RecognizeError::NoLayout)?;
    let values = decode_params(types.clone(), data)?;
    if is_trivial_echo(&types, &values, data) {
        return Err(RecognizeError::TrivialEcho);
    }

    Ok(MatchedCall {
        source: DecodeSource::AbiEncodedGuess,
        function_name: String::new(),
        signature: signature_of(&types),
        selector: None,
        inputs: guessed_inputs(&types),
        values,
    })
}

/// Treat the payload as a call to an unknown function: selector plus arguments
pub fn recognize_fragment(data: &[u8]) -> Result<MatchedCall, RecognizeError> {
    let selector = calldata::selector(data).ok_or(RecognizeError::Length {
        actual: data.len(),
        expected: "4-byte selector",
    })?;
    let args = &data[4..];
    if args.len() % WORD != 0 {
        return Err(RecognizeError::Length {
            actual: data.len(),
            expected: "selector plus whole words",
        });
    }

    let (types, values) = if args.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        let types = infer_types(args).ok_or(RecognizeError::NoLayout)?;
        let values = decode_params(types.clone(), args)?;
        (types, values)
    };

    Ok(MatchedCall {
        source: DecodeSource::FragmentGuess,
        function_name: String::new(),
        signature: signature_of(&types),
        selector: Some(selector),
        inputs: guessed_inputs(&types),
        values,
    })
}
