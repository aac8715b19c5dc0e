//! Fixed-width integers matching the EVM word size.

use uint::construct_uint;

construct_uint! {
    /// Unsigned 256-bit integer, the width of every ABI word.
    pub struct U256(4);
}

construct_uint! {
    /// Intermediate width for products of two `U256` values.
    pub struct U512(8);
}

impl From<U256> for U512 {
    fn from(value: U256) -> U512 {
        let mut limbs = [0u64; 8];
        limbs[..4].copy_from_slice(&value.0);
        U512(limbs)
    }
}

impl U512 {
    /// Narrows back to 256 bits, `None` if the high half is set.
    pub fn to_u256(self) -> Option<U256> {
        if self.0[4..].iter().any(|limb| *limb != 0) {
            return None;
        }
        let mut limbs = [0u64; 4];
        limbs.copy_from_slice(&self.0[..4]);
        Some(U256(limbs))
    }
}

impl U256 {
    /// Big-endian 32-byte ABI encoding.
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        for (i, limb) in self.0.iter().enumerate() {
            let start = (3 - i) * 8;
            word[start..start + 8].copy_from_slice(&limb.to_be_bytes());
        }
        word
    }

    /// Decodes a big-endian word; shorter slices are treated as left-padded.
    pub fn from_word(word: &[u8]) -> U256 {
        U256::from_big_endian(word)
    }

    /// `0x`-prefixed minimal hex, the JSON-RPC quantity format.
    pub fn to_quantity(&self) -> String {
        format!("0x{:x}", self)
    }

    pub fn from_quantity(quantity: &str) -> Option<U256> {
        let digits = quantity.strip_prefix("0x").unwrap_or(quantity);
        if digits.is_empty() {
            return Some(U256::zero());
        }
        U256::from_str_radix(digits, 16).ok()
    }

    /// Returns the value as `u64` if it fits.
    pub fn try_to_u64(&self) -> Option<u64> {
        if self.bits() <= 64 {
            Some(self.low_u64())
        } else {
            None
        }
    }
}

pub trait CheckedMulDiv: Sized {
    /// `self * mul / div`, truncating, with a 512-bit intermediate product.
    fn checked_mul_div(self, mul: Self, div: Self) -> Option<Self>;
}

impl CheckedMulDiv for U256 {
    fn checked_mul_div(self, mul: U256, div: U256) -> Option<U256> {
        if div.is_zero() {
            return None;
        }
        let product = U512::from(self).checked_mul(U512::from(mul))?;
        product.checked_div(U512::from(div))?.to_u256()
    }
}

/// `base + rate * elapsed`, `None` when the result exceeds 256 bits.
pub fn checked_accrue(base: U256, rate: U256, elapsed: u64) -> Option<U256> {
    let accrued = U512::from(rate).checked_mul(U512::from(elapsed))?;
    U512::from(base).checked_add(accrued)?.to_u256()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_round_trips_through_big_endian() {
        let value = U256([9, 0, 0, 0x0102_0304_0506_0708]);
        let word = value.to_word();
        assert_eq!(word[0], 0x01);
        assert_eq!(word[31], 9);
        assert_eq!(U256::from_word(&word), value);
    }

    #[test]
    fn small_word_places_value_at_the_end() {
        let word = U256::from(42u64).to_word();
        assert_eq!(word[31], 42);
        assert!(word[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn quantity_is_minimal_hex() {
        assert_eq!(U256::from(255u64).to_quantity(), "0xff");
        assert_eq!(U256::from_quantity("0xff"), Some(U256::from(255u64)));
        assert_eq!(U256::from_quantity("0x"), Some(U256::zero()));
        assert_eq!(U256::from_quantity("0xzz"), None);
    }

    #[test]
    fn mul_div_survives_products_wider_than_256_bits() {
        let big = U256::MAX;
        assert_eq!(big.checked_mul_div(big, big), Some(big));
        assert_eq!(
            U256::from(7u64).checked_mul_div(U256::from(3u64), U256::from(2u64)),
            Some(U256::from(10u64))
        );
        assert_eq!(U256::one().checked_mul_div(U256::one(), U256::zero()), None);
    }

    #[test]
    fn accrue_rejects_overflow() {
        assert_eq!(
            checked_accrue(U256::from(10u64), U256::from(3u64), 5),
            Some(U256::from(25u64))
        );
        assert_eq!(checked_accrue(U256::MAX, U256::one(), 1), None);
    }

    #[test]
    fn u64_conversion_is_checked() {
        assert_eq!(U256::from(u64::MAX).try_to_u64(), Some(u64::MAX));
        assert_eq!((U256::from(u64::MAX) + U256::one()).try_to_u64(), None);
    }
}
