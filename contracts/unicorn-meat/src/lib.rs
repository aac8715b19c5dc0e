//! Records, ABI codec and reward math for the Unicorn Meat contracts.

pub mod proof_of_steak {
    crate::declare_address!("0x715d50635fE3CDe8A4b7f4601D266459bee60EcA");
}

/// Wrapped Unicorn Meat (w🍖), the token staked in Proof of Steak.
pub mod wrapped_unicorn_meat {
    crate::declare_address!("0xDFA208BB0B811cFBB5Fa3Ea98Ec37Aa86180e668");
}

/// The original Unicorn Meat token.
pub mod unicorn_meat {
    crate::declare_address!("0xED6aC8de7c7CA7e3A22952e09C2a2A1232DDef9A");
}

/// The Grinder Association DAO.
pub mod grinder_association {
    crate::declare_address!("0xc7e9dDd5358e08417b1C88ed6f1a73149BEeaa32");
}

pub mod unicorns {
    crate::declare_address!("0x89205A3A3b2A69De6Dbf7f01ED13B2108B2c43e7");
}

pub mod wrapped_unicorns {
    crate::declare_address!("0x38a9af1bd00f9988977095b31eb18d6d3d5dca00");
}

/// Merkle airdrop distributor.
pub mod merkle_claim {
    crate::declare_address!("0xEC2c2AdEB8Ee3A338485ae684D1B1CB6DA0A498c");
}

pub mod ens_registry {
    crate::declare_address!("0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e");
}

/// Both meat tokens use three decimals.
pub const MEAT_DECIMALS: u32 = 3;
pub const UNICORN_DECIMALS: u32 = 0;
pub const ETHER_DECIMALS: u32 = 18;

/// ETH attached to every DAO vote (0.001 ETH).
pub const VOTE_BRIBE_WEI: u64 = 1_000_000_000_000_000;
/// Used when the node cannot estimate a claim.
pub const CLAIM_GAS_FALLBACK: u64 = 300_000;
/// Percentage added on top of a gas estimate.
pub const GAS_BUFFER_PERCENT: u64 = 20;

/// Grinder Association deployment, Mar-24-2016 22:55:56 UTC.
pub const DAO_DEPLOYED_AT: u64 = 1_458_860_156;

/// Transactions that created each proposal, indexed by proposal id.
pub const PROPOSAL_TX_HASHES: [&str; 10] = [
    "0x4a599406f09d6217c8cee835993570b44616c38c5c69bb6e9debdf08469fb743",
    "0xff421649f71a14648dc9876bfc45eee33fc26696500d3687d59cacd3b43b45af",
    "0x208bff05bc2d315dacf29d958390cfc25ad8429a379413d48ef575ff4770035f",
    "0xfa1df1087adf1292cd168e62f290cff48c6ddb476e85800c6591649c4f09a9e2",
    "0xd48a84bd702ec736409ab9d50fbc4d8a3361782872358f27330e125f3279790e",
    "0x5064e324bd93e811d035ed352d0e2632ff30b15ada341fecff8df9780a07474b",
    "0x78b92f3952e72e4714fdb4124da6bb367fad03b77c46e71b4f73045d0c78e1c4",
    "0xb9c3ef46288df5a5153dc2e21329c1b87f9a9a908cf89fbf4c65fc5901ed22b6",
    "0x7bf0cefc8d201d653bc2c68b2bfb9057491b67592a5198d7cfc9850791fe7f20",
    "0xb017486a6663035f0a541eb7ee4d42138b1e8d411686900155214bcd27e6b7a9",
];

/// Known `grindUnicorns` transactions, earliest first.
pub const GRIND_TX_HASHES: [&str; 8] = [
    "0xd4f62ab6acaba60529fe23c1c96b90902ce3846ae11e2d14a84b85502a09e5f3",
    "0x310e418a533ed2a49ba7e45a092e6b1dfac8072633ea55cadaf1e80c4e55a00e",
    "0x3e0cdf86e789aa791aea64bae28b183639a38af6d833d175960b81ec25c3d71e",
    "0x42041e3f59318b9481831074e352fba2121b2d22d130c1fab9216aa7be492f48",
    "0x39c5f952da5b89e041d00143e16b67f16c93985178004b6e1f924eef5c233040",
    "0x25aa9444d46d051b97d6212ae7469316d346391f3c0307afc8fb14b7efcd4970",
    "0xe7ab66c6fe9936d05b97e2b2a34a93e26f13aa3c3ecb8d5d8f586a30de30eb36",
    "0x885c853f389dd3d05259c8afb586d6e337e138e59d4c0f52b2cc8c4dead23c69",
];

pub const BALANCE_OF_SIGNATURE: &str = "balanceOf(address)";
pub const ALLOWANCE_SIGNATURE: &str = "allowance(address,address)";
pub const APPROVE_SIGNATURE: &str = "approve(address,uint256)";
pub const APPROVE_AND_CALL_SIGNATURE: &str = "approveAndCall(address,uint256)";
pub const UNWRAP_SIGNATURE: &str = "unwrap(uint256)";
pub const STEAK_SIGNATURE: &str = "steak(uint256)";
pub const UNSTEAK_SIGNATURE: &str = "unsteak()";

pub mod abi;
pub mod curve;
pub mod error;
pub mod states;
pub mod utils;
