//! Router command strings: one opcode byte per command

use alloy_dyn_abi::DynSolValue;

use super::RecognizeError;
use crate::domain::abi::{DecodeSource, MatchedCall, ParamSpec};

/// Set on commands that may revert without failing the whole batch
pub const FLAG_ALLOW_REVERT: u8 = 0x80;
const RESERVED_BIT: u8 = 0x40;
const COMMAND_MASK: u8 = 0x3f;

const COMMANDS: &[(u8, &str)] = &[
    (0x00, "V3_SWAP_EXACT_IN"),
    (0x01, "V3_SWAP_EXACT_OUT"),
    (0x02, "PERMIT2_TRANSFER_FROM"),
    (0x03, "PERMIT2_PERMIT_BATCH"),
    (0x04, "SWEEP"),
    (0x05, "TRANSFER"),
    (0x06, "PAY_PORTION"),
    (0x08, "V2_SWAP_EXACT_IN"),
    (0x09, "V2_SWAP_EXACT_OUT"),
    (0x0a, "PERMIT2_PERMIT"),
    (0x0b, "WRAP_ETH"),
    (0x0c, "UNWRAP_WETH"),
    (0x0d, "PERMIT2_TRANSFER_FROM_BATCH"),
    (0x0e, "BALANCE_CHECK_ERC20"),
    (0x10, "V4_SWAP"),
    (0x11, "V3_POSITION_MANAGER_PERMIT"),
    (0x12, "V3_POSITION_MANAGER_CALL"),
    (0x13, "V4_INITIALIZE_POOL"),
    (0x14, "V4_POSITION_MANAGER_CALL"),
    (0x21, "EXECUTE_SUB_PLAN"),
];

/// Name of a command byte, ignoring the allow-revert flag
pub fn command_name(byte: u8) -> Option<&'static str> {
    if byte & RESERVED_BIT != 0 {
        return None;
    }
    let command = byte & COMMAND_MASK;
    COMMANDS
        .iter()
        .find(|(code, _)| *code == command)
        .map(|(_, name)| *name)
}

pub fn recognize(data: &[u8]) -> Result<MatchedCall, RecognizeError> {
    if data.is_empty() {
        return Err(RecognizeError::Empty);
    }

    let mut values = Vec::with_capacity(data.len());
    for (position, &byte) in data.iter().enumerate() {
        let name = command_name(byte).ok_or(RecognizeError::UnknownCommand { byte, position })?;
        let label = if byte & FLAG_ALLOW_REVERT != 0 {
            format!("{name} (allow revert)")
        } else {
            name.to_string()
        };
        values.push(DynSolValue::String(label));
    }

    Ok(MatchedCall {
        source: DecodeSource::RouterCommands,
        function_name: "commands".to_string(),
        signature: format!("commands({})", vec!["string"; values.len()].join(",")),
        selector: None,
        inputs: (0..values.len())
            .map(|i| ParamSpec::new(format!("command #{i}"), "string"))
            .collect(),
        values,
    })
}
