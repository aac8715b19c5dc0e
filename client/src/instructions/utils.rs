use unicorn_meat::abi::{encode_call, Token};
use unicorn_meat::error::{ErrorCode, Result};
use unicorn_meat::utils::{keccak256, parse_units, Address, U256};
use unicorn_meat::GAS_BUFFER_PERCENT;

pub const ENS_RESOLVER_SIGNATURE: &str = "resolver(bytes32)";
pub const ENS_NAME_SIGNATURE: &str = "name(bytes32)";
pub const ENS_ADDR_SIGNATURE: &str = "addr(bytes32)";

/// ENS namehash of a dotted name; the empty name hashes to zero.
pub fn namehash(name: &str) -> [u8; 32] {
    let mut node = [0u8; 32];
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let label_hash = keccak256(label.as_bytes());
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(&node);
        buf[32..].copy_from_slice(&label_hash);
        node = keccak256(&buf);
    }
    node
}

/// Node of `<address>.addr.reverse`.
pub fn reverse_node(address: &Address) -> [u8; 32] {
    namehash(&format!("{}.addr.reverse", address.to_lower_hex()))
}

pub fn resolver_call(node: [u8; 32]) -> Vec<u8> {
    encode_call(ENS_RESOLVER_SIGNATURE, &[Token::FixedBytes(node)])
}

pub fn name_call(node: [u8; 32]) -> Vec<u8> {
    encode_call(ENS_NAME_SIGNATURE, &[Token::FixedBytes(node)])
}

pub fn addr_call(node: [u8; 32]) -> Vec<u8> {
    encode_call(ENS_ADDR_SIGNATURE, &[Token::FixedBytes(node)])
}

pub fn balance_of_call(owner: &Address) -> Vec<u8> {
    encode_call(unicorn_meat::BALANCE_OF_SIGNATURE, &[Token::Address(*owner)])
}

pub fn ensure_positive(amount: U256, what: &str) -> Result<()> {
    if amount.is_zero() {
        return Err(ErrorCode::InvalidInput(format!("{} must be greater than zero", what)));
    }
    Ok(())
}

/// Parses a user-entered amount that must be strictly positive.
pub fn parse_positive_amount(input: &str, decimals: u32) -> Result<U256> {
    let amount = parse_units(input, decimals)?;
    ensure_positive(amount, "amount")?;
    Ok(amount)
}

/// Gas limit with the safety margin wallets expect.
pub fn gas_with_buffer(estimate: U256) -> U256 {
    estimate * U256::from(100 + GAS_BUFFER_PERCENT) / U256::from(100u64)
}
