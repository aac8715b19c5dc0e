pub mod address;
pub use address::*;

pub mod hash;
pub use hash::*;

pub mod math;
pub use math::*;

pub mod units;
pub use units::*;
