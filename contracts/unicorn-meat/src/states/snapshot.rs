use crate::states::{PoolState, StakeRecord};

/// Everything the reward estimator needs, read at a single point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StakeSnapshot {
    pub record: StakeRecord,
    pub pool: PoolState,
    /// Wall-clock UNIX seconds at which the snapshot was taken.
    pub now: u64,
}
