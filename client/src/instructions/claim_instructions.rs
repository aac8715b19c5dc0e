use crate::instructions::rpc::TxRequest;
use crate::ClientConfig;
use unicorn_meat::abi::{encode_call, Token};
use unicorn_meat::states::{
    CLAIM_SIGNATURE, GET_CLAIMABLE_AMOUNT_SIGNATURE, HAS_CLAIMED_SIGNATURE,
};
use unicorn_meat::utils::{Address, U256};

pub const CLAIMED_AMOUNTS_SIGNATURE: &str = "claimedAmounts(address)";

fn claim_args(account: Address, amount: U256, proof: &[[u8; 32]]) -> [Token; 3] {
    [
        Token::Address(account),
        Token::Uint(amount),
        Token::FixedBytesArray(proof.to_vec()),
    ]
}

/// `claim(account, amount, proof)`; gas fields are filled in by the caller.
pub fn claim_instr(
    config: &ClientConfig,
    account: Address,
    amount: U256,
    proof: &[[u8; 32]],
) -> TxRequest {
    TxRequest::new(
        config.contracts.merkle_claim,
        encode_call(CLAIM_SIGNATURE, &claim_args(account, amount, proof)),
    )
}

pub fn has_claimed_call(account: Address) -> Vec<u8> {
    encode_call(HAS_CLAIMED_SIGNATURE, &[Token::Address(account)])
}

pub fn claimed_amount_call(account: Address) -> Vec<u8> {
    encode_call(CLAIMED_AMOUNTS_SIGNATURE, &[Token::Address(account)])
}

pub fn claimable_amount_call(account: Address, amount: U256, proof: &[[u8; 32]]) -> Vec<u8> {
    encode_call(
        GET_CLAIMABLE_AMOUNT_SIGNATURE,
        &claim_args(account, amount, proof),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicorn_meat::abi::selector;

    #[test]
    fn claim_encodes_the_proof_as_a_dynamic_array() {
        let config = ClientConfig::new("http://localhost:8545");
        let proof = [[0xaa; 32], [0xbb; 32]];
        let tx = claim_instr(&config, Address([1; 20]), U256::from(42u64), &proof);
        assert_eq!(tx.to, unicorn_meat::merkle_claim::ID);
        assert_eq!(&tx.data[..4], &selector("claim(address,uint256,bytes32[])"));
        // head offset, then length 2 and both nodes
        assert_eq!(tx.data[4 + 95], 96);
        assert_eq!(tx.data[4 + 127], 2);
        assert_eq!(tx.data.len(), 4 + 6 * 32);
    }
}
