use crate::instructions::rpc::TxRequest;
use crate::instructions::utils::ensure_positive;
use crate::ClientConfig;
use unicorn_meat::abi::{encode_call, Token};
use unicorn_meat::error::Result;
use unicorn_meat::utils::{Address, U256};
use unicorn_meat::{APPROVE_SIGNATURE, STEAK_SIGNATURE, UNSTEAK_SIGNATURE};

/// `approve(spender, amount)` on an ERC20 token.
pub fn approve_instr(token: Address, spender: Address, amount: U256) -> TxRequest {
    TxRequest::new(
        token,
        encode_call(
            APPROVE_SIGNATURE,
            &[Token::Address(spender), Token::Uint(amount)],
        ),
    )
}

/// Lets Proof of Steak pull `amount` wrapped meat from the user.
pub fn approve_steak_instr(config: &ClientConfig, amount: U256) -> Result<TxRequest> {
    ensure_positive(amount, "steak amount")?;
    Ok(approve_instr(
        config.contracts.wrapped_meat,
        config.contracts.proof_of_steak,
        amount,
    ))
}

pub fn steak_instr(config: &ClientConfig, amount: U256) -> Result<TxRequest> {
    ensure_positive(amount, "steak amount")?;
    Ok(TxRequest::new(
        config.contracts.proof_of_steak,
        encode_call(STEAK_SIGNATURE, &[Token::Uint(amount)]),
    ))
}

/// Withdraws the whole stake.
pub fn unsteak_instr(config: &ClientConfig) -> TxRequest {
    TxRequest::new(
        config.contracts.proof_of_steak,
        encode_call(UNSTEAK_SIGNATURE, &[]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicorn_meat::abi::selector;

    #[test]
    fn steak_targets_the_staking_contract() {
        let config = ClientConfig::new("http://localhost:8545");
        let tx = steak_instr(&config, U256::from(1500u64)).unwrap();
        assert_eq!(tx.to, unicorn_meat::proof_of_steak::ID);
        assert_eq!(&tx.data[..4], &selector("steak(uint256)"));
        assert!(tx.value.is_zero());
        assert!(steak_instr(&config, U256::zero()).is_err());
    }

    #[test]
    fn approval_is_on_the_wrapped_token() {
        let config = ClientConfig::new("http://localhost:8545");
        let tx = approve_steak_instr(&config, U256::from(5u64)).unwrap();
        assert_eq!(tx.to, unicorn_meat::wrapped_unicorn_meat::ID);
        assert_eq!(&tx.data[4 + 12..4 + 32], unicorn_meat::proof_of_steak::ID.as_bytes());
    }
}
