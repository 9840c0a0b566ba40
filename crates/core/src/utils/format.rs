//! Display formatting for amounts and percentages.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{CURRENCY_SYMBOL, DISPLAY_DECIMAL_PRECISION};

/// Formats an amount as `$1,234.50`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = round_for_display(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let (whole, fraction) = split_fixed(rounded.abs());
    format!(
        "{}{}{}.{}",
        sign,
        CURRENCY_SYMBOL,
        group_thousands(&whole),
        fraction
    )
}

/// Formats a signed amount as `+$12.00` / `-$12.00`.
pub fn format_signed_currency(amount: Decimal) -> String {
    if amount >= Decimal::ZERO {
        format!("+{}", format_currency(amount))
    } else {
        format_currency(amount)
    }
}

/// Formats a percentage value (already in percent) as `+12.35%`.
pub fn format_percent(value: Decimal) -> String {
    let rounded = round_for_display(value);
    let (whole, fraction) = split_fixed(rounded.abs());
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        "+"
    };
    format!("{}{}.{}%", sign, whole, fraction)
}

/// Formats a share count with thousands separators.
pub fn format_shares(shares: i64) -> String {
    let grouped = group_thousands(&shares.unsigned_abs().to_string());
    if shares < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn round_for_display(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(
        DISPLAY_DECIMAL_PRECISION,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

fn split_fixed(value: Decimal) -> (String, String) {
    let text = format!("{:.*}", DISPLAY_DECIMAL_PRECISION as usize, value);
    match text.split_once('.') {
        Some((whole, fraction)) => (whole.to_string(), fraction.to_string()),
        None => (text, "0".repeat(DISPLAY_DECIMAL_PRECISION as usize)),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(dec!(300)), "$300.00");
        assert_eq!(format_currency(dec!(0)), "$0.00");
        assert_eq!(format_currency(dec!(1234.5)), "$1,234.50");
        assert_eq!(format_currency(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_currency(dec!(999.995)), "$1,000.00");
        assert_eq!(format_currency(dec!(-42.1)), "-$42.10");
        assert_eq!(format_currency(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn test_format_signed_currency() {
        assert_eq!(format_signed_currency(dec!(12)), "+$12.00");
        assert_eq!(format_signed_currency(dec!(-12)), "-$12.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(12.345)), "+12.35%");
        assert_eq!(format_percent(dec!(-3.2)), "-3.20%");
        assert_eq!(format_percent(dec!(0)), "+0.00%");
    }

    #[test]
    fn test_format_shares() {
        assert_eq!(format_shares(12500), "12,500");
        assert_eq!(format_shares(999), "999");
        assert_eq!(format_shares(-1000), "-1,000");
    }
}
