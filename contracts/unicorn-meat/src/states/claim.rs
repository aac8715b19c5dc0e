use crate::abi::decode_hex;
use crate::error::{ErrorCode, Result};
use crate::utils::U256;

pub const CLAIM_SIGNATURE: &str = "claim(address,uint256,bytes32[])";
pub const HAS_CLAIMED_SIGNATURE: &str = "hasClaimed(address)";
pub const GET_CLAIMABLE_AMOUNT_SIGNATURE: &str = "getClaimableAmount(address,uint256,bytes32[])";

/// Merkle airdrop entitlement as published by the claim backend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimEligibility {
    /// Smallest-unit amount (3 decimals) committed in the Merkle tree.
    pub claimable_amount: U256,
    pub has_claimed: bool,
    pub merkle_proof: Vec<[u8; 32]>,
}

impl ClaimEligibility {
    /// Whether a claim transaction is worth building at all.
    pub fn is_claimable(&self) -> bool {
        !self.claimable_amount.is_zero() && !self.has_claimed && !self.merkle_proof.is_empty()
    }
}

/// Parses `0x`-prefixed 32-byte proof nodes.
pub fn parse_merkle_proof<S: AsRef<str>>(nodes: &[S]) -> Result<Vec<[u8; 32]>> {
    nodes
        .iter()
        .map(|node| {
            let bytes = decode_hex(node.as_ref())?;
            <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
                ErrorCode::InvalidInput(format!(
                    "proof node `{}` is {} bytes, expected 32",
                    node.as_ref(),
                    bytes.len()
                ))
            })
        })
        .collect()
}
