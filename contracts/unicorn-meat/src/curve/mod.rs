pub mod estimator;
pub use estimator::*;

pub mod season;
pub use season::*;
