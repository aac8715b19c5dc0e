use crate::instructions::rpc::TxRequest;
use crate::ClientConfig;
use unicorn_meat::abi::{decode_hex, encode_call, Token};
use unicorn_meat::error::{ErrorCode, Result};
use unicorn_meat::utils::{Address, U256};
use unicorn_meat::VOTE_BRIBE_WEI;

pub const VOTE_SIGNATURE: &str = "vote(uint256,bool)";
pub const NEW_PROPOSAL_SIGNATURE: &str = "newProposal(address,uint256,string,bytes)";

/// Every vote carries a 0.001 ETH bribe.
pub fn vote_instr(config: &ClientConfig, proposal_id: u64, supports: bool) -> TxRequest {
    TxRequest::new(
        config.contracts.dao,
        encode_call(
            VOTE_SIGNATURE,
            &[Token::Uint(U256::from(proposal_id)), Token::Bool(supports)],
        ),
    )
    .with_value(U256::from(VOTE_BRIBE_WEI))
}

/// `bytecode` is the transaction the DAO will run if the proposal passes.
pub fn new_proposal_instr(
    config: &ClientConfig,
    beneficiary: Address,
    ether_amount: U256,
    description: &str,
    bytecode: &str,
    bribe: U256,
) -> Result<TxRequest> {
    if description.trim().is_empty() {
        return Err(ErrorCode::InvalidInput(
            "proposal description must not be empty".to_string(),
        ));
    }
    let bytecode = decode_hex(bytecode)?;
    Ok(TxRequest::new(
        config.contracts.dao,
        encode_call(
            NEW_PROPOSAL_SIGNATURE,
            &[
                Token::Address(beneficiary),
                Token::Uint(ether_amount),
                Token::String(description.to_string()),
                Token::Bytes(bytecode),
            ],
        ),
    )
    .with_value(bribe))
}
