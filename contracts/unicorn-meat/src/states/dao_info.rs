use crate::abi::Decoder;
use crate::error::{ErrorCode, Result};
use crate::utils::{Address, U256};

pub const NUM_PROPOSALS: &str = "numProposals()";
pub const TOTAL_UNICORNS_KILLED: &str = "totalUnicornsKilled()";
pub const MINIMUM_QUORUM: &str = "minimumQuorum()";
pub const DEBATING_PERIOD_IN_MINUTES: &str = "debatingPeriodInMinutes()";
pub const REJECTION_MULTIPLIER: &str = "rejectionMultiplier()";
pub const UNICORN_TOKEN_ADDRESS: &str = "unicornTokenAddress()";
pub const MEAT_TOKEN_ADDRESS: &str = "meatTokenAddress()";
pub const MEAT_PROVIDER: &str = "meatProvider()";
pub const OWNER: &str = "owner()";

/// Grinder Association governance parameters and linked contracts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DaoInfo {
    pub num_proposals: u64,
    pub total_unicorns_killed: U256,
    pub minimum_quorum: U256,
    pub debating_period_minutes: U256,
    pub rejection_multiplier: U256,
    /// Token whose holders may vote and propose.
    pub unicorn_token: Address,
    pub meat_token: Address,
    pub meat_provider: Address,
    pub owner: Address,
}

impl DaoInfo {
    pub const GETTERS: [&'static str; 9] = [
        NUM_PROPOSALS,
        TOTAL_UNICORNS_KILLED,
        MINIMUM_QUORUM,
        DEBATING_PERIOD_IN_MINUTES,
        REJECTION_MULTIPLIER,
        UNICORN_TOKEN_ADDRESS,
        MEAT_TOKEN_ADDRESS,
        MEAT_PROVIDER,
        OWNER,
    ];

    pub fn from_returns(returns: &[Vec<u8>]) -> Result<Self> {
        if returns.len() != Self::GETTERS.len() {
            return Err(ErrorCode::Decode(format!(
                "expected {} DAO getters, got {}",
                Self::GETTERS.len(),
                returns.len()
            )));
        }
        Ok(DaoInfo {
            num_proposals: Decoder::new(&returns[0]).u64()?,
            total_unicorns_killed: Decoder::new(&returns[1]).uint()?,
            minimum_quorum: Decoder::new(&returns[2]).uint()?,
            debating_period_minutes: Decoder::new(&returns[3]).uint()?,
            rejection_multiplier: Decoder::new(&returns[4]).uint()?,
            unicorn_token: Decoder::new(&returns[5]).address()?,
            meat_token: Decoder::new(&returns[6]).address()?,
            meat_provider: Decoder::new(&returns[7]).address()?,
            owner: Decoder::new(&returns[8]).address()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{encode, Token};

    #[test]
    fn assembles_from_getter_returns() {
        let mut returns: Vec<Vec<u8>> = (0..5u64)
            .map(|i| encode(&[Token::Uint(U256::from(10 + i))]))
            .collect();
        returns.extend((0..4u8).map(|i| encode(&[Token::Address(Address([i; 20]))])));
        let info = DaoInfo::from_returns(&returns).unwrap();
        assert_eq!(info.num_proposals, 10);
        assert_eq!(info.rejection_multiplier, U256::from(14u64));
        assert_eq!(info.unicorn_token, Address([0; 20]));
        assert_eq!(info.owner, Address([3; 20]));
    }
}
