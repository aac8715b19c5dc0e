use crate::abi::Decoder;
use crate::error::Result;
use crate::utils::{Address, U256};
use std::fmt;

//
// ──────────────────────────────────────────────────────────────────────────────
// ProposalRecord: Grinder Association `proposals(uint256)` tuple
// ──────────────────────────────────────────────────────────────────────────────
//

pub const PROPOSALS_SIGNATURE: &str = "proposals(uint256)";

/// One entry of the DAO's append-only, index-addressed proposal list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProposalRecord {
    /// Beneficiary of the proposed transfer.
    pub recipient: Address,

    /// Proposed ETH amount in wei.
    pub amount: U256,

    pub description: String,

    /// UNIX timestamp after which votes are no longer accepted.
    pub voting_deadline: u64,

    pub executed: bool,

    pub passed: bool,

    pub vote_count: U256,

    /// Hash of the proposal's transaction bytecode.
    pub proposal_hash: [u8; 32],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProposalStatus {
    Executed,
    Passed,
    Expired,
    Active,
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ProposalStatus::Executed => "Executed",
            ProposalStatus::Passed => "Passed",
            ProposalStatus::Expired => "Expired",
            ProposalStatus::Active => "Active",
        };
        f.write_str(text)
    }
}

impl ProposalRecord {
    /// Decodes `(address,uint256,string,uint256,bool,bool,uint256,bytes32)`.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        Ok(ProposalRecord {
            recipient: decoder.address()?,
            amount: decoder.uint()?,
            description: decoder.string()?,
            voting_deadline: decoder.u64()?,
            executed: decoder.bool()?,
            passed: decoder.bool()?,
            vote_count: decoder.uint()?,
            proposal_hash: decoder.fixed_bytes()?,
        })
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.voting_deadline < now
    }

    /// Executed wins over passed, passed over expired.
    pub fn status(&self, now: u64) -> ProposalStatus {
        if self.executed {
            ProposalStatus::Executed
        } else if self.passed {
            ProposalStatus::Passed
        } else if self.is_expired(now) {
            ProposalStatus::Expired
        } else {
            ProposalStatus::Active
        }
    }

    pub fn accepts_votes(&self, now: u64) -> bool {
        !self.executed && !self.is_expired(now)
    }

    pub fn awaits_execution(&self) -> bool {
        self.passed && !self.executed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{encode, Token};

    fn proposal(executed: bool, passed: bool, deadline: u64) -> ProposalRecord {
        ProposalRecord {
            voting_deadline: deadline,
            executed,
            passed,
            ..Default::default()
        }
    }

    #[test]
    fn status_precedence() {
        assert_eq!(proposal(true, true, 0).status(100), ProposalStatus::Executed);
        assert_eq!(proposal(false, true, 0).status(100), ProposalStatus::Passed);
        assert_eq!(proposal(false, false, 50).status(100), ProposalStatus::Expired);
        assert_eq!(proposal(false, false, 150).status(100), ProposalStatus::Active);
    }

    #[test]
    fn voting_window() {
        assert!(proposal(false, false, 150).accepts_votes(100));
        assert!(!proposal(false, false, 50).accepts_votes(100));
        assert!(!proposal(true, false, 150).accepts_votes(100));
        assert!(proposal(false, true, 50).awaits_execution());
    }

    #[test]
    fn decodes_tuple_with_description() {
        let data = encode(&[
            Token::Address(Address([0x33; 20])),
            Token::Uint(U256::exp10(18)),
            Token::String("Buy more grinders".to_string()),
            Token::Uint(U256::from(1_458_860_156u64)),
            Token::Bool(false),
            Token::Bool(true),
            Token::Uint(U256::from(4u64)),
            Token::FixedBytes([0x44; 32]),
        ]);
        let record = ProposalRecord::decode(&data).unwrap();
        assert_eq!(record.recipient, Address([0x33; 20]));
        assert_eq!(record.description, "Buy more grinders");
        assert_eq!(record.voting_deadline, 1_458_860_156);
        assert!(record.passed);
        assert_eq!(record.vote_count, U256::from(4u64));
        assert_eq!(record.proposal_hash, [0x44; 32]);
    }
}
