use crate::error::ErrorCode;
use crate::utils::keccak256;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// A 20-byte account or contract address.
///
/// Parsing accepts any casing; display always uses the EIP-55 mixed-case
/// checksum so addresses printed by the client can be pasted into explorers
/// and wallets unchanged.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

fn address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("static pattern"))
}

const fn hex_nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => panic!("invalid hex digit in address literal"),
    }
}

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    /// Compile-time parse of a `0x`-prefixed literal; used for the fixed
    /// contract addresses.
    pub const fn from_literal(literal: &str) -> Address {
        let bytes = literal.as_bytes();
        assert!(bytes.len() == 42, "address literal must be 42 characters");
        assert!(bytes[0] == b'0' && bytes[1] == b'x', "address literal must start with 0x");
        let mut out = [0u8; 20];
        let mut i = 0;
        while i < 20 {
            out[i] = (hex_nibble(bytes[2 + i * 2]) << 4) | hex_nibble(bytes[3 + i * 2]);
            i += 1;
        }
        Address(out)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Lowercase hex without the `0x` prefix.
    pub fn to_lower_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// EIP-55 checksummed form.
    pub fn to_checksum(&self) -> String {
        let lower = self.to_lower_hex();
        let hash = keccak256(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    /// `0x1234...abcd` form for narrow columns.
    pub fn short(&self) -> String {
        let full = self.to_checksum();
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }
}

impl FromStr for Address {
    type Err = ErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !address_pattern().is_match(trimmed) {
            return Err(ErrorCode::InvalidInput(format!("malformed address `{}`", s)));
        }
        let mut out = [0u8; 20];
        hex::decode_to_slice(&trimmed[2..], &mut out)
            .map_err(|e| ErrorCode::InvalidInput(format!("malformed address `{}`: {}", s, e)))?;
        Ok(Address(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Declares an `ID` constant and `id()` accessor for a fixed contract.
#[macro_export]
macro_rules! declare_address {
    ($literal:expr) => {
        pub const ID: $crate::utils::Address = $crate::utils::Address::from_literal($literal);

        pub fn id() -> $crate::utils::Address {
            ID
        }
    };
}
