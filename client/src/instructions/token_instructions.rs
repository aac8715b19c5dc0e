use crate::instructions::rpc::TxRequest;
use crate::instructions::utils::ensure_positive;
use crate::ClientConfig;
use unicorn_meat::abi::{encode_call, Token};
use unicorn_meat::error::Result;
use unicorn_meat::utils::U256;
use unicorn_meat::{APPROVE_AND_CALL_SIGNATURE, UNWRAP_SIGNATURE};

/// Wrapping goes through the original token's `approveAndCall`, which calls
/// back into the wrapper in the same transaction.
pub fn wrap_instr(config: &ClientConfig, amount: U256) -> Result<TxRequest> {
    ensure_positive(amount, "wrap amount")?;
    Ok(TxRequest::new(
        config.contracts.meat,
        encode_call(
            APPROVE_AND_CALL_SIGNATURE,
            &[
                Token::Address(config.contracts.wrapped_meat),
                Token::Uint(amount),
            ],
        ),
    ))
}

pub fn unwrap_instr(config: &ClientConfig, amount: U256) -> Result<TxRequest> {
    ensure_positive(amount, "unwrap amount")?;
    Ok(TxRequest::new(
        config.contracts.wrapped_meat,
        encode_call(UNWRAP_SIGNATURE, &[Token::Uint(amount)]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicorn_meat::abi::selector;

    #[test]
    fn wrap_calls_the_original_token() {
        let config = ClientConfig::new("http://localhost:8545");
        let tx = wrap_instr(&config, U256::from(2500u64)).unwrap();
        assert_eq!(tx.to, unicorn_meat::unicorn_meat::ID);
        assert_eq!(&tx.data[..4], &selector("approveAndCall(address,uint256)"));
        assert_eq!(&tx.data[4 + 12..4 + 32], unicorn_meat::wrapped_unicorn_meat::ID.as_bytes());
    }

    #[test]
    fn unwrap_calls_the_wrapper() {
        let config = ClientConfig::new("http://localhost:8545");
        let tx = unwrap_instr(&config, U256::from(1u64)).unwrap();
        assert_eq!(tx.to, unicorn_meat::wrapped_unicorn_meat::ID);
        assert!(unwrap_instr(&config, U256::zero()).is_err());
    }
}
