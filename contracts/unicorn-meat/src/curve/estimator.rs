//! Off-chain replay of the Proof of Steak accrual formula.
//!
//! The contract stays the source of truth; these numbers are for display.

use crate::states::{PoolState, StakeRecord, StakeSnapshot};
use crate::utils::{checked_accrue, CheckedMulDiv, U256};
use std::fmt;

/// Denominator of [`Estimate::pool_share_bps`].
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Why the gated `claimable_reward` of an [`Estimate`] is zero.
///
/// Variants are listed in the order the gate checks them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ineligibility {
    /// The stake or pool could not be read.
    Unavailable,
    NoStake,
    /// Some of the stake was withdrawn during the season.
    StakeReduced,
    SeasonNotStarted,
    SeasonInProgress,
    NoAccruedSteakTime,
}

impl Ineligibility {
    /// Whether waiting for the season to end would make the stake eligible.
    pub fn is_pending(&self) -> bool {
        matches!(self, Ineligibility::SeasonInProgress)
    }
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Ineligibility::Unavailable => "Stake data unavailable",
            Ineligibility::NoStake => "Nothing steaked",
            Ineligibility::StakeReduced => "Stake was reduced during the season",
            Ineligibility::SeasonNotStarted => "Season has not started",
            Ineligibility::SeasonInProgress => "Available after season ends",
            Ineligibility::NoAccruedSteakTime => "No steak time accrued",
        };
        f.write_str(text)
    }
}

/// Derived view of a stake, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Estimate {
    pub simulated_user_accumulator: U256,
    pub simulated_total_accumulator: U256,
    /// Pool share in basis points, `0..=10000`.
    pub pool_share_bps: u64,
    /// Projected share of the reward pool, ignoring eligibility.
    pub estimated_reward: U256,
    /// What the contract would pay out right now.
    pub claimable_reward: U256,
    /// Set whenever `claimable_reward` is zero because of the gate.
    pub ineligibility: Option<Ineligibility>,
}

impl Estimate {
    pub fn zero() -> Self {
        Estimate {
            simulated_user_accumulator: U256::zero(),
            simulated_total_accumulator: U256::zero(),
            pool_share_bps: 0,
            estimated_reward: U256::zero(),
            claimable_reward: U256::zero(),
            ineligibility: Some(Ineligibility::Unavailable),
        }
    }

    /// Two-decimal percentage, e.g. `42.50%`.
    pub fn pool_share_percent(&self) -> String {
        format!(
            "{}.{:02}%",
            self.pool_share_bps / 100,
            self.pool_share_bps % 100
        )
    }
}

/// Concrete struct to hang the estimator's associated functions on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RewardEstimator {}

impl RewardEstimator {
    /// Replays accrual up to `now` (capped at the season end) and derives the
    /// user's share of the reward pool.
    ///
    /// Never fails: an accumulator that would not fit in 256 bits yields
    /// [`Estimate::zero`].
    pub fn estimate(record: &StakeRecord, pool: &PoolState, now: u64) -> Estimate {
        Self::try_estimate(record, pool, now).unwrap_or_else(Estimate::zero)
    }

    /// [`Self::estimate`] over a snapshot that may have failed to load.
    pub fn estimate_snapshot(snapshot: Option<&StakeSnapshot>) -> Estimate {
        match snapshot {
            Some(snapshot) => Self::estimate(&snapshot.record, &snapshot.pool, snapshot.now),
            None => Estimate::zero(),
        }
    }

    /// The estimate as it will stand once the season is over.
    pub fn project_to_season_end(record: &StakeRecord, pool: &PoolState) -> Estimate {
        Self::estimate(record, pool, pool.season_end)
    }

    /// Simulated `(user, total)` accumulators at `now`.
    ///
    /// The pool's last global update is not exposed by the contract, so the
    /// season start stands in for it.
    pub fn simulate_accumulators(
        record: &StakeRecord,
        pool: &PoolState,
        now: u64,
    ) -> Option<(U256, U256)> {
        if !pool.has_started() {
            return Some((
                record.stake_time_accumulator,
                pool.total_stake_time_accumulator,
            ));
        }
        let effective_now = now.min(pool.season_end);

        let mut total = pool.total_stake_time_accumulator;
        if !pool.total_staked.is_zero() && effective_now > pool.season_start {
            total = checked_accrue(
                total,
                pool.total_staked,
                effective_now - pool.season_start,
            )?;
        }

        let user_last_update = if record.last_update > 0 {
            record.last_update
        } else {
            pool.season_start
        };
        let mut user = record.stake_time_accumulator;
        if !record.amount.is_zero() && effective_now > user_last_update {
            user = checked_accrue(user, record.amount, effective_now - user_last_update)?;
        }
        Some((user, total))
    }

    fn try_estimate(record: &StakeRecord, pool: &PoolState, now: u64) -> Option<Estimate> {
        let (user, total) = Self::simulate_accumulators(record, pool, now)?;

        let (pool_share_bps, estimated_reward) =
            if !record.amount.is_zero() && !total.is_zero() && !user.is_zero() {
                (
                    Self::share_bps(user, total)?,
                    pool.reward_pool.checked_mul_div(user, total)?,
                )
            } else {
                (0, U256::zero())
            };

        let (claimable_reward, ineligibility) = match Self::gate(record, pool, now, total) {
            Some(reason) => (U256::zero(), Some(reason)),
            None => (pool.reward_pool.checked_mul_div(user, total)?, None),
        };

        Some(Estimate {
            simulated_user_accumulator: user,
            simulated_total_accumulator: total,
            pool_share_bps,
            estimated_reward,
            claimable_reward,
            ineligibility,
        })
    }

    /// Basis points rounded half-up, clamped to 100%. The raw reward
    /// itself still truncates.
    fn share_bps(user: U256, total: U256) -> Option<u64> {
        let doubled = user.checked_mul_div(U256::from(2 * BPS_DENOMINATOR), total)?;
        let rounded = doubled.checked_add(U256::one())? / U256::from(2u64);
        Some(rounded.min(U256::from(BPS_DENOMINATOR)).low_u64())
    }

    /// Mirrors the contract's claim conditions, first failing clause wins.
    pub fn gate(
        record: &StakeRecord,
        pool: &PoolState,
        now: u64,
        simulated_total: U256,
    ) -> Option<Ineligibility> {
        if record.amount.is_zero() {
            Some(Ineligibility::NoStake)
        } else if record.has_reduced_stake() {
            Some(Ineligibility::StakeReduced)
        } else if !pool.started {
            Some(Ineligibility::SeasonNotStarted)
        } else if now < pool.season_end {
            Some(Ineligibility::SeasonInProgress)
        } else if simulated_total.is_zero() {
            Some(Ineligibility::NoAccruedSteakTime)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(amount: u64, max: u64, acc: u64, last_update: u64) -> StakeRecord {
        StakeRecord {
            amount: U256::from(amount),
            stake_time_accumulator: U256::from(acc),
            last_update,
            max_amount_ever_staked: U256::from(max),
            claimed: false,
        }
    }

    fn pool(total_staked: u64, reward_pool: u64) -> PoolState {
        PoolState {
            total_staked: U256::from(total_staked),
            total_stake_time_accumulator: U256::zero(),
            reward_pool: U256::from(reward_pool),
            season_start: 1000,
            season_end: 2000,
            started: true,
            funded: true,
            season_length_seconds: 1000,
        }
    }

    #[test]
    fn sole_staker_at_season_end_takes_the_pool() {
        let estimate = RewardEstimator::estimate(
            &record(1000, 1000, 0, 1000),
            &pool(1000, 500_000),
            2000,
        );
        assert_eq!(estimate.simulated_user_accumulator, U256::from(1_000_000u64));
        assert_eq!(estimate.simulated_total_accumulator, U256::from(1_000_000u64));
        assert_eq!(estimate.pool_share_percent(), "100.00%");
        assert_eq!(estimate.estimated_reward, U256::from(500_000u64));
        assert_eq!(estimate.claimable_reward, U256::from(500_000u64));
        assert_eq!(estimate.ineligibility, None);
    }

    #[test]
    fn mid_season_is_gated() {
        let estimate = RewardEstimator::estimate(
            &record(1000, 1000, 0, 1000),
            &pool(1000, 500_000),
            1500,
        );
        assert_eq!(estimate.claimable_reward, U256::zero());
        assert_eq!(estimate.ineligibility, Some(Ineligibility::SeasonInProgress));
        assert_eq!(estimate.estimated_reward, U256::from(500_000u64));
        assert!(Ineligibility::SeasonInProgress.is_pending());
    }

    #[test]
    fn reduced_stake_is_never_claimable() {
        let estimate = RewardEstimator::estimate(
            &record(500, 1000, 0, 1000),
            &pool(1000, 500_000),
            2000,
        );
        assert!(estimate.simulated_user_accumulator > U256::zero());
        assert_eq!(estimate.claimable_reward, U256::zero());
        assert_eq!(estimate.ineligibility, Some(Ineligibility::StakeReduced));
    }

    #[test]
    fn zero_amount_yields_nothing_even_with_leftover_accumulator() {
        let estimate = RewardEstimator::estimate(
            &record(0, 1000, 40_000, 1200),
            &pool(1000, 500_000),
            2000,
        );
        assert_eq!(estimate.pool_share_bps, 0);
        assert_eq!(estimate.estimated_reward, U256::zero());
        assert_eq!(estimate.ineligibility, Some(Ineligibility::NoStake));
    }

    #[test]
    fn unstarted_season_keeps_fetched_accumulators() {
        let mut unstarted = pool(1000, 500_000);
        unstarted.started = false;
        let estimate = RewardEstimator::estimate(&record(1000, 1000, 7, 0), &unstarted, 5000);
        assert_eq!(estimate.simulated_user_accumulator, U256::from(7u64));
        assert_eq!(estimate.simulated_total_accumulator, U256::zero());
        assert_eq!(estimate.ineligibility, Some(Ineligibility::SeasonNotStarted));
    }

    #[test]
    fn share_rounds_half_up() {
        assert_eq!(RewardEstimator::share_bps(U256::from(1u64), U256::from(3u64)), Some(3333));
        assert_eq!(RewardEstimator::share_bps(U256::from(2u64), U256::from(3u64)), Some(6667));
        assert_eq!(RewardEstimator::share_bps(U256::from(1u64), U256::from(20_000u64)), Some(1));
        assert_eq!(RewardEstimator::share_bps(U256::from(5u64), U256::from(3u64)), Some(10_000));
    }

    #[test]
    fn overflowing_accrual_degrades_to_zero() {
        let mut huge = pool(1000, 500_000);
        huge.total_stake_time_accumulator = U256::MAX;
        let estimate = RewardEstimator::estimate(&record(1000, 1000, 0, 1000), &huge, 2000);
        assert_eq!(estimate, Estimate::zero());
    }

    #[test]
    fn user_accumulator_above_total_degrades_to_zero() {
        let record = StakeRecord {
            amount: U256::one(),
            stake_time_accumulator: U256::MAX,
            last_update: 5000,
            max_amount_ever_staked: U256::one(),
            claimed: false,
        };
        let mut pool = pool(0, 0);
        pool.total_stake_time_accumulator = U256::from(2 * BPS_DENOMINATOR);
        assert_eq!(RewardEstimator::estimate(&record, &pool, 3000), Estimate::zero());
    }

    #[test]
    fn missing_snapshot_is_zero() {
        assert_eq!(RewardEstimator::estimate_snapshot(None), Estimate::zero());
        assert_eq!(Estimate::zero().pool_share_percent(), "0.00%");
    }
}
