use crate::abi::Decoder;
use crate::error::{ErrorCode, Result};
use crate::utils::U256;

//
// ──────────────────────────────────────────────────────────────────────────────
// PoolState: Proof of Steak global getters
// ──────────────────────────────────────────────────────────────────────────────
//

pub const TOTAL_STEAKED: &str = "totalSteaked()";
pub const TOTAL_STEAK_TIME: &str = "totalSteakTime()";
pub const REWARD_POOL: &str = "rewardPool()";
pub const SEASON_START: &str = "seasonStart()";
pub const SEASON_END: &str = "seasonEnd()";
pub const SEASON_STARTED: &str = "seasonStarted()";
pub const REWARD_POOL_FUNDED: &str = "rewardPoolFunded()";
pub const SEASON_LENGTH_SECONDS: &str = "seasonLengthSeconds()";

/// Global season snapshot, fetched once per read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolState {
    /// Sum of all participants' staked amounts.
    pub total_staked: U256,

    /// Global steak-time accumulator as of the contract's last global update.
    pub total_stake_time_accumulator: U256,

    /// w🍖 distributed pro rata at season end.
    pub reward_pool: U256,

    /// UNIX timestamp the season started, 0 before the start.
    pub season_start: u64,

    /// UNIX timestamp the season ends, 0 before the start.
    pub season_end: u64,

    pub started: bool,

    pub funded: bool,

    /// Configured season length; known before the season starts.
    pub season_length_seconds: u64,
}

impl PoolState {
    /// Getter signatures in the order [`PoolState::from_returns`] expects.
    pub const GETTERS: [&'static str; 8] = [
        TOTAL_STEAKED,
        TOTAL_STEAK_TIME,
        REWARD_POOL,
        SEASON_START,
        SEASON_END,
        SEASON_STARTED,
        REWARD_POOL_FUNDED,
        SEASON_LENGTH_SECONDS,
    ];

    /// Assembles the state from one return blob per getter.
    pub fn from_returns(returns: &[Vec<u8>]) -> Result<Self> {
        if returns.len() != Self::GETTERS.len() {
            return Err(ErrorCode::Decode(format!(
                "expected {} pool getters, got {}",
                Self::GETTERS.len(),
                returns.len()
            )));
        }
        Ok(PoolState {
            total_staked: Decoder::new(&returns[0]).uint()?,
            total_stake_time_accumulator: Decoder::new(&returns[1]).uint()?,
            reward_pool: Decoder::new(&returns[2]).uint()?,
            season_start: Decoder::new(&returns[3]).u64()?,
            season_end: Decoder::new(&returns[4]).u64()?,
            started: Decoder::new(&returns[5]).bool()?,
            funded: Decoder::new(&returns[6]).bool()?,
            season_length_seconds: Decoder::new(&returns[7]).u64()?,
        })
    }

    pub fn has_started(&self) -> bool {
        self.started && self.season_start > 0
    }
}
