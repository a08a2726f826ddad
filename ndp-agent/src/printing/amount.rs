//! Wei amount formatting
//!
//! Converts an on-chain integer amount (wei, 10^18 per token) into a display
//! quantity. Arithmetic is exact: the integer part is a big-integer quotient,
//! the fractional part an 18-scale decimal remainder.

use num_bigint::{BigInt, BigUint, Sign};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

/// Supported token symbol
pub const TOKEN_SYMBOL: &str = "USDT";

/// Token decimals (wei per token = 10^18)
const TOKEN_DECIMALS: u32 = 18;

/// Decimal-string length above which digits are parsed as a big integer
const BIG_DECIMAL_MIN_LEN: usize = 16;

/// Normalize a token field to a display symbol.
///
/// Only USDT is supported; the token field (symbol or contract address) is
/// ignored until a lookup table is needed.
pub fn normalize_token_symbol(_token: &str) -> &'static str {
    TOKEN_SYMBOL
}

/// Format a raw wei amount as `"<quantity> <SYMBOL>"`. Never fails.
pub fn normalize(amount_raw: &str, token: &str) -> String {
    let symbol = normalize_token_symbol(token);

    match parse_wei(amount_raw) {
        Some(wei) => {
            let mut quantity = format_token_quantity(wei.magnitude());
            if wei.sign() == Sign::Minus && quantity != "0" {
                quantity.insert(0, '-');
            }
            debug!(amount = amount_raw, quantity = %quantity, symbol, "amount formatted");
            format!("{} {}", quantity, symbol)
        }
        None => {
            warn!(amount = amount_raw, "unparseable amount, printing raw value");
            format!("{} {}", abbreviate_raw(amount_raw), symbol)
        }
    }
}

/// Parse a wei amount.
///
/// - `0x`/`0X` prefix: base-16 big integer
/// - optional `-` and more than 15 digits: base-10 big integer
/// - otherwise: i64, defaulting to 0 when it does not parse
///
/// Decimal input keeps its sign. Returns `None` only for malformed hex.
fn parse_wei(raw: &str) -> Option<BigInt> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        return BigUint::parse_bytes(hex.as_bytes(), 16).map(BigInt::from);
    }

    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.len() >= BIG_DECIMAL_MIN_LEN && digits.bytes().all(|b| b.is_ascii_digit()) {
        return BigInt::parse_bytes(raw.as_bytes(), 10);
    }

    Some(BigInt::from(raw.parse::<i64>().unwrap_or(0)))
}

/// wei / 10^18 as a plain decimal string, no exponent notation.
///
/// Whole quantities print as integers. Quantities below 0.000001 keep up to
/// 18 fractional digits; anything else is rounded half-up to 6 digits.
/// Trailing zeros are stripped in both cases.
fn format_token_quantity(wei: &BigUint) -> String {
    let scale = BigUint::from(10u32).pow(TOKEN_DECIMALS);
    let mut whole = wei / &scale;
    let remainder = wei % &scale;

    // remainder < 10^18 always fits
    let remainder = u64::try_from(&remainder).unwrap_or(0);
    if remainder == 0 {
        return whole.to_string();
    }

    let fraction = Decimal::from_i128_with_scale(i128::from(remainder), TOKEN_DECIMALS);
    let min_rounded = Decimal::new(1, 6);

    let fraction = if whole.bits() == 0 && fraction < min_rounded {
        fraction
    } else {
        let rounded = fraction.round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero);
        if rounded >= Decimal::ONE {
            whole += 1u32;
            rounded - Decimal::ONE
        } else {
            rounded
        }
    };

    if fraction.is_zero() {
        return whole.to_string();
    }

    // "0.5" -> ".5"
    let fraction = fraction.normalize().to_string();
    let digits = fraction.trim_start_matches('0');
    format!("{}{}", whole, digits)
}

/// Shorten long raw input to first 8 + "..." + last 4 characters
fn abbreviate_raw(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() > 20 {
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(normalize("0", "X"), "0 USDT");
        assert_eq!(normalize("0x0", "X"), "0 USDT");
    }

    #[test]
    fn test_whole_tokens() {
        assert_eq!(normalize("1000000000000000000", "X"), "1 USDT");
        assert_eq!(normalize("25000000000000000000", "USDT"), "25 USDT");
    }

    #[test]
    fn test_fractional_tokens() {
        assert_eq!(normalize("4500000000000000000", "X"), "4.5 USDT");
        assert_eq!(normalize("1234567000000000000", "X"), "1.234567 USDT");
        assert_eq!(normalize("100000000000000000", "X"), "0.1 USDT");
    }

    #[test]
    fn test_one_wei_is_plain_decimal() {
        assert_eq!(normalize("1", "X"), "0.000000000000000001 USDT");
    }

    #[test]
    fn test_small_amounts_keep_18_places() {
        // 0.00000012345 tokens
        assert_eq!(normalize("123450000000", "X"), "0.00000012345 USDT");
        // 999999999999 wei < 0.000001
        assert_eq!(normalize("999999999999", "X"), "0.000000999999999999 USDT");
    }

    #[test]
    fn test_rounds_half_up_to_six_places() {
        // 1.0000005 -> 1.000001
        assert_eq!(normalize("1000000500000000000", "X"), "1.000001 USDT");
        // 1.0000004999 -> 1
        assert_eq!(normalize("1000000499900000000", "X"), "1 USDT");
        // exactly 0.000001
        assert_eq!(normalize("1000000000000", "X"), "0.000001 USDT");
    }

    #[test]
    fn test_rounding_carries_into_whole_part() {
        // 1.9999999 -> 2
        assert_eq!(normalize("1999999900000000000", "X"), "2 USDT");
        // 0.9999999 -> 1
        assert_eq!(normalize("999999900000000000", "X"), "1 USDT");
    }

    #[test]
    fn test_hex_and_decimal_agree() {
        for wei in [
            0u128,
            1,
            999_999_999_999,
            1_000_000_000_000,
            4_500_000_000_000_000_000,
            123_456_789_012_345_678_901,
            u128::from(u64::MAX),
            u128::MAX,
        ] {
            let decimal = normalize(&wei.to_string(), "X");
            let hex = normalize(&format!("0x{:x}", wei), "X");
            let upper = normalize(&format!("0X{:X}", wei), "X");
            assert_eq!(decimal, hex, "wei = {wei}");
            assert_eq!(decimal, upper, "wei = {wei}");
        }
    }

    #[test]
    fn test_beyond_u128() {
        // 2^256 - 1 wei
        let max_u256 = "0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";
        let formatted = normalize(max_u256, "X");
        assert_eq!(
            formatted,
            "115792089237316195423570985008687907853269984665640564039457.584008 USDT"
        );
    }

    #[test]
    fn test_short_non_numeric_defaults_to_zero() {
        assert_eq!(normalize("abc", "X"), "0 USDT");
        assert_eq!(normalize("12.5", "X"), "0 USDT");
        assert_eq!(normalize("", "X"), "0 USDT");
    }

    #[test]
    fn test_malformed_hex_falls_back_to_raw() {
        assert_eq!(normalize("0xZZ", "X"), "0xZZ USDT");
        assert_eq!(normalize("0x", "X"), "0x USDT");
        assert_eq!(
            normalize("0x12345678901234567890zz99", "X"),
            "0x123456...zz99 USDT"
        );
    }

    #[test]
    fn test_negative_amounts_keep_sign_and_scale() {
        assert_eq!(normalize("-5", "X"), "-0.000000000000000005 USDT");
        assert_eq!(normalize("-4500000000000000000", "X"), "-4.5 USDT");
        assert_eq!(normalize("-1999999900000000000", "X"), "-2 USDT");
        assert_eq!(normalize("-0", "X"), "0 USDT");
    }

    #[test]
    fn test_token_symbol_is_normalized() {
        assert_eq!(
            normalize_token_symbol("0xdac17f958d2ee523a2206206994597c13d831ec7"),
            "USDT"
        );
    }
}
