pub mod claim;
pub use claim::*;

pub mod dao_info;
pub use dao_info::*;

pub mod hall_of_fame;
pub use hall_of_fame::*;

pub mod pool_state;
pub use pool_state::*;

pub mod proposal;
pub use proposal::*;

pub mod snapshot;
pub use snapshot::*;

pub mod stake_record;
pub use stake_record::*;
