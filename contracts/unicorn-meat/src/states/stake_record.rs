use crate::abi::Decoder;
use crate::error::Result;
use crate::utils::U256;

//
// ──────────────────────────────────────────────────────────────────────────────
// StakeRecord: the Proof of Steak `steaks(address)` tuple
// ──────────────────────────────────────────────────────────────────────────────
//

/// Getter signature for a participant's record.
pub const STEAKS_SIGNATURE: &str = "steaks(address)";

/// Per-participant staking record kept by the Proof of Steak contract.
///
/// Created on the first `steak`, mutated by every `steak`/`unsteak`. Read-only
/// from the client's point of view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StakeRecord {
    /// Currently staked w🍖 (smallest unit, 3 decimals).
    pub amount: U256,

    /// Running sum of `amount × elapsed_seconds` up to `last_update`.
    pub stake_time_accumulator: U256,

    /// UNIX timestamp (seconds) of the last accumulator update, 0 if never.
    pub last_update: u64,

    /// Largest `amount` this participant ever had staked. Dropping below it
    /// disqualifies the participant from claiming.
    pub max_amount_ever_staked: U256,

    /// Whether the season reward has already been claimed.
    pub claimed: bool,
}

impl StakeRecord {
    /// Decodes the `(uint256,uint256,uint256,uint256,bool)` return tuple.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        Ok(StakeRecord {
            amount: decoder.uint()?,
            stake_time_accumulator: decoder.uint()?,
            last_update: decoder.u64()?,
            max_amount_ever_staked: decoder.uint()?,
            claimed: decoder.bool()?,
        })
    }

    pub fn has_stake(&self) -> bool {
        !self.amount.is_zero()
    }

    /// True once the participant withdrew below their historical maximum.
    pub fn has_reduced_stake(&self) -> bool {
        self.amount < self.max_amount_ever_staked
    }
}
