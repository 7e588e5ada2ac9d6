//! End-to-end decoding through the public `Decoder` with in-memory resolvers

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use anyhow::{anyhow, Result};
use async_trait::async_trait;

use calldata_lens::domain::abi::{AbiSource, ResolvedAbi, SignatureResolver};
use calldata_lens::engine::recognizers::guess;
use calldata_lens::{
    DecodeContext, DecodeSource, DecodedCall, DecodedValue, Decoder, DecoderConfig, Scalar,
};

sol! {
    function transfer(address to, uint256 amount);
}

const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

#[derive(Default)]
struct MockSignatures {
    signatures: HashMap<[u8; 4], Vec<String>>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockSignatures {
    fn with_transfer() -> Self {
        let mut signatures = HashMap::new();
        signatures.insert(
            transferCall::SELECTOR,
            vec![
                // collides on selector but does not decode
                "transfer(bytes,bytes,bytes)".to_string(),
                "transfer(address,uint256)".to_string(),
            ],
        );
        Self {
            signatures,
            ..Default::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl SignatureResolver for MockSignatures {
    async fn resolve_selector(&self, selector: [u8; 4]) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("registry unreachable"));
        }
        Ok(self.signatures.get(&selector).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct MockAbis {
    abis: HashMap<Address, ResolvedAbi>,
}

#[async_trait]
impl AbiSource for MockAbis {
    async fn resolve_abi(&self, address: Address, _chain_id: u64) -> Result<ResolvedAbi> {
        self.abis
            .get(&address)
            .cloned()
            .ok_or_else(|| anyhow!("contract {address} is not verified"))
    }
}

fn decoder_with(signatures: Arc<MockSignatures>, abis: MockAbis) -> Decoder {
    Decoder::new(signatures, Arc::new(abis))
}

fn transfer_calldata() -> Vec<u8> {
    transferCall {
        to: VITALIK.parse().unwrap(),
        amount: U256::from(1_000_000u64),
    }
    .abi_encode()
}

fn execute_calldata(calls: &[(Address, u64, Vec<u8>)]) -> Vec<u8> {
    let array = DynSolValue::Array(
        calls
            .iter()
            .map(|(to, value, data)| {
                DynSolValue::Tuple(vec![
                    DynSolValue::Address(*to),
                    DynSolValue::Uint(U256::from(*value), 256),
                    DynSolValue::Bytes(data.clone()),
                ])
            })
            .collect(),
    );
    let mut out = vec![0xe9, 0xae, 0x5c, 0x53];
    out.extend(
        DynSolValue::Tuple(vec![
            DynSolValue::FixedBytes(Default::default(), 32),
            DynSolValue::Bytes(DynSolValue::Tuple(vec![array]).abi_encode_params()),
        ])
        .abi_encode_params(),
    );
    out
}

fn multisend_entry(to: Address, value: u64, data: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8];
    out.extend_from_slice(to.as_slice());
    out.extend_from_slice(&U256::from(value).to_be_bytes::<32>());
    out.extend_from_slice(&U256::from(data.len()).to_be_bytes::<32>());
    out.extend_from_slice(data);
    out
}

fn text_with_ratio(printable: usize, control: usize) -> Vec<u8> {
    let mut out = vec![b'a'; printable];
    out.extend(std::iter::repeat(0x01).take(control));
    out
}

/// Nested call stored in the `data` member of the `tx #i` tuple
fn inner_call(call: &DecodedCall, index: usize) -> Option<&DecodedCall> {
    let DecodedValue::Tuple(Some(members)) = &call.arguments[index].value else {
        panic!("expected a tuple argument");
    };
    let data = members.iter().find(|member| member.name == "data")?;
    match &data.value {
        DecodedValue::Bytes(inner) => inner.as_deref(),
        other => panic!("expected bytes, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transfer_via_selector_registry() {
    let decoder = decoder_with(Arc::new(MockSignatures::with_transfer()), MockAbis::default());

    let decoded = decoder
        .decode(&transfer_calldata(), &DecodeContext::new())
        .await
        .unwrap();

    assert_eq!(decoded.source, DecodeSource::SelectorRegistry);
    assert_eq!(decoded.function_name, "transfer");
    assert_eq!(decoded.signature, "transfer(address,uint256)");
    assert_eq!(decoded.arguments.len(), 2);
    assert_eq!(
        decoded.arguments[0].value,
        DecodedValue::Scalar(Scalar::Address(VITALIK.to_string()))
    );
    assert_eq!(
        decoded.arguments[1].value,
        DecodedValue::Scalar(Scalar::Integer("1000000".to_string()))
    );
}

#[tokio::test]
async fn test_decode_hex_matches_decode() {
    let decoder = decoder_with(Arc::new(MockSignatures::with_transfer()), MockAbis::default());
    let hex_input = format!("0x{}", hex::encode(transfer_calldata()));

    let from_hex = decoder.decode_hex(&hex_input, &DecodeContext::new()).await;
    let from_bytes = decoder.decode(&transfer_calldata(), &DecodeContext::new()).await;
    assert!(from_hex.is_some());
    assert_eq!(from_hex, from_bytes);
}

#[tokio::test]
async fn test_registry_failure_degrades_to_fragment_guess() {
    let decoder = decoder_with(Arc::new(MockSignatures::failing()), MockAbis::default());

    let decoded = decoder
        .decode(&transfer_calldata(), &DecodeContext::new())
        .await
        .unwrap();

    assert_eq!(decoded.source, DecodeSource::FragmentGuess);
    assert!(decoded.function_name.is_empty());
    assert_eq!(decoded.signature, "(address,uint256)");
    assert_eq!(decoded.label(), "0xa9059cbb");
}

#[tokio::test]
async fn test_selector_registry_not_consulted_when_nested() {
    let signatures = Arc::new(MockSignatures::with_transfer());
    let decoder = decoder_with(signatures.clone(), MockAbis::default());
    let target = Address::repeat_byte(0x22);
    let payload = execute_calldata(&[(target, 0, transfer_calldata())]);

    let decoded = decoder.decode(&payload, &DecodeContext::new()).await.unwrap();
    assert_eq!(decoded.source, DecodeSource::BatchedExecute);
    assert_eq!(decoded.arguments[0].name, "tx #0");

    let inner = inner_call(&decoded, 0).unwrap();
    assert_eq!(inner.source, DecodeSource::FragmentGuess);
    assert_ne!(inner.function_name, "transfer");
    assert_eq!(signatures.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_batched_calls_keep_declaration_order() {
    let decoder = Decoder::offline();
    let payload = execute_calldata(&[
        (Address::repeat_byte(0x01), 1, b"first message".to_vec()),
        (Address::repeat_byte(0x02), 2, Vec::new()),
        (Address::repeat_byte(0x03), 3, b"third message".to_vec()),
    ]);

    let decoded = decoder.decode(&payload, &DecodeContext::new()).await.unwrap();
    let names: Vec<_> = decoded.arguments.iter().map(|arg| arg.name.as_str()).collect();
    assert_eq!(names, vec!["tx #0", "tx #1", "tx #2"]);

    assert_eq!(inner_call(&decoded, 0).unwrap().source, DecodeSource::Utf8Text);
    assert!(inner_call(&decoded, 1).is_none());
    assert_eq!(
        inner_call(&decoded, 2).unwrap().raw_args,
        vec![DynSolValue::String("third message".to_string())]
    );
}

#[tokio::test]
async fn test_depth_ceiling_leaves_bytes_undecoded() {
    let decoder = Decoder::offline().with_config(DecoderConfig { max_depth: 0 });
    let payload = execute_calldata(&[(Address::repeat_byte(0x01), 0, b"hello there".to_vec())]);

    let decoded = decoder.decode(&payload, &DecodeContext::new()).await.unwrap();
    assert_eq!(decoded.source, DecodeSource::BatchedExecute);
    assert!(inner_call(&decoded, 0).is_none());
}

#[tokio::test]
async fn test_multisend_wins_over_abi_guess() {
    let payload = multisend_entry(Address::repeat_byte(0x11), 0, &[0xaa; 11]);
    assert_eq!(payload.len(), 96);
    assert!(guess::recognize_encoded(&payload).is_ok());

    let decoded = Decoder::offline()
        .decode(&payload, &DecodeContext::new())
        .await
        .unwrap();
    assert_eq!(decoded.source, DecodeSource::MultiSend);
    assert_eq!(decoded.function_name, "multiSend");
    assert_eq!(decoded.arguments[0].declared_type, "(uint8,address,uint256,bytes)");
}

#[tokio::test]
async fn test_truncated_multisend_falls_through() {
    let mut payload = multisend_entry(Address::repeat_byte(0x11), 0, &[0xaa; 11]);
    payload.pop();

    let decoded = Decoder::offline().decode(&payload, &DecodeContext::new()).await;
    assert!(decoded.is_none());
}

#[tokio::test]
async fn test_unknown_multisend_operation_falls_through_to_abi_guess() {
    let mut payload = multisend_entry(Address::repeat_byte(0x11), 0, &[0xaa; 11]);
    payload[0] = 2;

    let decoded = Decoder::offline()
        .decode(&payload, &DecodeContext::new())
        .await
        .unwrap();
    assert_eq!(decoded.source, DecodeSource::AbiEncodedGuess);
    assert_eq!(decoded.signature, "(bytes32,uint256,uint256)");
}

#[tokio::test]
async fn test_swap_path_wins_over_text() {
    let payload = b"this sentence is exactly forty-three bytes.".to_vec();
    assert_eq!(payload.len(), 43);

    let decoded = Decoder::offline()
        .decode(&payload, &DecodeContext::new())
        .await
        .unwrap();
    assert_eq!(decoded.source, DecodeSource::SwapPath);
    assert_eq!(decoded.arguments[1].name, "fee");
}

#[tokio::test]
async fn test_abi_guess_wins_over_router_commands() {
    let payload = vec![0x0b; 64];

    let decoded = Decoder::offline()
        .decode(&payload, &DecodeContext::new())
        .await
        .unwrap();
    assert_eq!(decoded.source, DecodeSource::AbiEncodedGuess);
    assert_eq!(decoded.signature, "(uint256,uint256)");
}

#[tokio::test]
async fn test_router_commands_win_over_fragment_guess() {
    let payload = vec![0x0b, 0x00, 0x0c, 0x04];

    let decoded = Decoder::offline()
        .decode(&payload, &DecodeContext::new())
        .await
        .unwrap();
    assert_eq!(decoded.source, DecodeSource::RouterCommands);
    assert_eq!(decoded.arguments.len(), 4);
    assert_eq!(
        decoded.arguments[2].value,
        DecodedValue::Scalar(Scalar::Text("UNWRAP_WETH".to_string()))
    );
}

#[tokio::test]
async fn test_text_threshold() {
    let decoder = Decoder::offline();

    let rejected = decoder
        .decode(&text_with_ratio(158, 42), &DecodeContext::new())
        .await;
    assert!(rejected.is_none());

    let accepted = decoder
        .decode(&text_with_ratio(162, 38), &DecodeContext::new())
        .await
        .unwrap();
    assert_eq!(accepted.source, DecodeSource::Utf8Text);
    assert_eq!(accepted.arguments[0].name, "message");
}

#[tokio::test]
async fn test_idempotent() {
    let decoder = decoder_with(Arc::new(MockSignatures::with_transfer()), MockAbis::default());
    let payload = execute_calldata(&[
        (Address::repeat_byte(0x01), 5, transfer_calldata()),
        (Address::repeat_byte(0x02), 0, b"gm".to_vec()),
    ]);

    let first = decoder.decode(&payload, &DecodeContext::new()).await;
    let second = decoder.decode(&payload, &DecodeContext::new()).await;
    assert!(first.is_some());
    assert_eq!(first, second);
}

fn proxy_fixture() -> (Address, Address, MockAbis) {
    let proxy = Address::repeat_byte(0xaa);
    let implementation = Address::repeat_byte(0xbb);
    let proxy_abi = JsonAbi::parse(["function transfer(address dst, uint256 wad)"]).unwrap();
    let implementation_abi =
        JsonAbi::parse(["function transfer(address recipient, uint256 amount)"]).unwrap();

    let mut abis = HashMap::new();
    abis.insert(proxy, ResolvedAbi::proxy(proxy_abi, implementation));
    abis.insert(implementation, ResolvedAbi::new(implementation_abi));
    (proxy, implementation, MockAbis { abis })
}

#[tokio::test]
async fn test_proxy_prefers_implementation_abi() {
    let (proxy, _, abis) = proxy_fixture();
    let decoder = decoder_with(Arc::new(MockSignatures::default()), abis);

    let decoded = decoder
        .decode(&transfer_calldata(), &DecodeContext::with_contract(proxy, 1))
        .await
        .unwrap();

    assert_eq!(decoded.source, DecodeSource::ContractAbi);
    assert_eq!(decoded.function_name, "transfer");
    assert_eq!(decoded.arguments[0].name, "recipient");
    assert_eq!(decoded.arguments[1].name, "amount");
}

#[tokio::test]
async fn test_proxy_abi_used_when_implementation_unavailable() {
    let (proxy, implementation, mut abis) = proxy_fixture();
    abis.abis.remove(&implementation);
    let decoder = decoder_with(Arc::new(MockSignatures::default()), abis);

    let decoded = decoder
        .decode(&transfer_calldata(), &DecodeContext::with_contract(proxy, 1))
        .await
        .unwrap();
    assert_eq!(decoded.arguments[0].name, "dst");
}

#[tokio::test]
async fn test_proxy_abi_used_when_implementation_abi_empty() {
    let (proxy, implementation, mut abis) = proxy_fixture();
    abis.abis.insert(implementation, ResolvedAbi::default());
    let decoder = decoder_with(Arc::new(MockSignatures::default()), abis);

    let decoded = decoder
        .decode(&transfer_calldata(), &DecodeContext::with_contract(proxy, 1))
        .await
        .unwrap();
    assert_eq!(decoded.arguments[1].name, "wad");
}

#[tokio::test]
async fn test_unverified_contract_falls_through_to_cascade() {
    let decoder = decoder_with(Arc::new(MockSignatures::with_transfer()), MockAbis::default());
    let ctx = DecodeContext::with_contract(Address::repeat_byte(0x33), 1);

    let decoded = decoder.decode(&transfer_calldata(), &ctx).await.unwrap();
    assert_eq!(decoded.source, DecodeSource::SelectorRegistry);

    let text = decoder.decode(b"please sign in", &ctx).await.unwrap();
    assert_eq!(text.source, DecodeSource::Utf8Text);
}

#[tokio::test]
async fn test_explicit_abi_decodes_without_cascade() {
    let abi = JsonAbi::parse(["function transfer(address to, uint256 amount)"]).unwrap();
    let decoder = decoder_with(Arc::new(MockSignatures::with_transfer()), MockAbis::default());
    let ctx = DecodeContext::with_abi(&abi);

    let decoded = decoder.decode(&transfer_calldata(), &ctx).await.unwrap();
    assert_eq!(decoded.source, DecodeSource::ExplicitAbi);
    assert_eq!(decoded.arguments[0].name, "to");

    let approve = hex::decode(concat!(
        "095ea7b3",
        "000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045",
        "0000000000000000000000000000000000000000000000000000000000000001",
    ))
    .unwrap();
    assert!(decoder.decode(&approve, &ctx).await.is_none());
}

#[tokio::test]
async fn test_json_output_shape() {
    let decoder = decoder_with(Arc::new(MockSignatures::with_transfer()), MockAbis::default());
    let decoded = decoder
        .decode(&transfer_calldata(), &DecodeContext::new())
        .await
        .unwrap();

    let json = serde_json::to_value(&decoded).unwrap();
    assert_eq!(json["selector"], "0xa9059cbb");
    assert_eq!(json["source"], "selector_registry");
    assert_eq!(json["arguments"][1]["base_type"], "integer");
    assert_eq!(json["arguments"][1]["value"]["kind"], "scalar");
    assert_eq!(json["arguments"][1]["value"]["value"], "1000000");
}
