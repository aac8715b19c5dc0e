pub mod claim_instructions;
pub mod dao_instructions;
pub mod rpc;
pub mod steak_instructions;
pub mod token_instructions;
pub mod utils;
