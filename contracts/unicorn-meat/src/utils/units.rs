//! Conversions between human-entered decimal amounts and smallest-unit integers.

use crate::error::ErrorCode;
use crate::utils::U256;

/// Parses a decimal string such as `"12.5"` into smallest units.
///
/// Rejects signs, exponents, separators and fractions longer than
/// `decimals`; the caller decides whether zero is acceptable.
pub fn parse_units(input: &str, decimals: u32) -> Result<U256, ErrorCode> {
    let trimmed = input.trim();
    let invalid = |reason: &str| ErrorCode::InvalidInput(format!("amount `{}`: {}", input, reason));
    if trimmed.is_empty() {
        return Err(invalid("empty"));
    }
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("no digits"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("not a plain decimal number"));
    }
    if fraction.len() > decimals as usize {
        return Err(invalid("fractional component exceeds decimals"));
    }
    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(if whole.is_empty() { "0" } else { whole });
    digits.push_str(fraction);
    for _ in fraction.len()..decimals as usize {
        digits.push('0');
    }
    U256::from_dec_str(&digits).map_err(|_| invalid("too large"))
}

fn split_units(value: U256, decimals: u32) -> (U256, U256) {
    let unit = U256::exp10(decimals as usize);
    (value / unit, value % unit)
}

fn fraction_digits(fraction: U256, decimals: u32) -> String {
    if decimals == 0 || fraction.is_zero() {
        return String::new();
    }
    let raw = fraction.to_string();
    let padded = format!("{}{}", "0".repeat(decimals as usize - raw.len()), raw);
    padded.trim_end_matches('0').to_string()
}

/// Exact decimal rendering with trailing zeros dropped.
pub fn format_units(value: U256, decimals: u32) -> String {
    let (whole, fraction) = split_units(value, decimals);
    let fraction = fraction_digits(fraction, decimals);
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Like [`format_units`] with comma thousands separators, e.g. `1,234.5`.
pub fn format_token_amount(value: U256, decimals: u32) -> String {
    let (whole, fraction) = split_units(value, decimals);
    let fraction = fraction_digits(fraction, decimals);
    let whole = group_thousands(&whole.to_string());
    if fraction.is_empty() {
        whole
    } else {
        format!("{}.{}", whole, fraction)
    }
}

fn one_decimal(numerator: U256, denominator: U256) -> String {
    let tenths = (numerator * U256::from(10u64) + denominator / U256::from(2u64)) / denominator;
    let ten = U256::from(10u64);
    format!("{}.{}", tenths / ten, tenths % ten)
}

/// Compact display with `K`/`M` suffixes and one decimal, e.g. `1.5M`.
pub fn format_large_number(value: U256, decimals: u32) -> String {
    let unit = U256::exp10(decimals as usize);
    let million = unit * U256::exp10(6);
    let thousand = unit * U256::exp10(3);
    if value >= million {
        format!("{}M", one_decimal(value, million))
    } else if value >= thousand {
        format!("{}K", one_decimal(value, thousand))
    } else {
        ((value + unit / U256::from(2u64)) / unit).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!(parse_units("12", 3).unwrap(), U256::from(12_000u64));
        assert_eq!(parse_units("12.5", 3).unwrap(), U256::from(12_500u64));
        assert_eq!(parse_units(" .001 ", 3).unwrap(), U256::from(1u64));
        assert_eq!(parse_units("0.001", 18).unwrap(), U256::exp10(15));
        assert_eq!(parse_units("7", 0).unwrap(), U256::from(7u64));
    }

    #[test]
    fn rejects_malformed_amounts() {
        for bad in ["", ".", "-1", "1e3", "1,000", "1.2.3", "abc", "0.0001"] {
            assert!(
                matches!(parse_units(bad, 3), Err(ErrorCode::InvalidInput(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn formats_exact_units() {
        assert_eq!(format_units(U256::from(12_500u64), 3), "12.5");
        assert_eq!(format_units(U256::from(12_000u64), 3), "12");
        assert_eq!(format_units(U256::from(5u64), 3), "0.005");
        assert_eq!(format_units(U256::from(5u64), 0), "5");
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(format_token_amount(U256::from(1_234_567_890u64), 3), "1,234,567.89");
        assert_eq!(format_token_amount(U256::from(999_000u64), 3), "999");
        assert_eq!(format_token_amount(U256::zero(), 3), "0");
    }

    #[test]
    fn compacts_large_numbers() {
        assert_eq!(format_large_number(U256::from(1_500_000_000u64), 3), "1.5M");
        assert_eq!(format_large_number(U256::from(2_340_000u64), 3), "2.3K");
        assert_eq!(format_large_number(U256::from(999_400u64), 3), "999");
        assert_eq!(format_large_number(U256::from(12u64), 0), "12");
    }
}
