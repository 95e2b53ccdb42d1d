//! Lenient numeric parsing for fiscal fields.
//!
//! Values are read the way the upstream producers tolerate them: a comma is
//! accepted as the decimal separator and trailing garbage after a numeric
//! prefix is ignored (`"12,50 BRL"` reads as `12.50`).

use std::str::FromStr;

use rust_decimal::Decimal;

use super::patterns::{LEADING_DECIMAL, LEADING_INTEGER};
use crate::models::document::Series;

/// Parse the leading decimal number of `text`, treating the first comma as
/// the decimal separator.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let normalized = text.trim_start().replacen(',', ".", 1);
    let matched = LEADING_DECIMAL.find(&normalized)?.as_str();

    let (mantissa, exponent) = match matched.find(['e', 'E']) {
        Some(pos) => (&matched[..pos], Some(&matched[pos + 1..])),
        None => (matched, None),
    };
    let (negative, unsigned) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let mut canonical = String::with_capacity(matched.len() + 2);
    if negative {
        canonical.push('-');
    }
    canonical.push_str(if integer.is_empty() { "0" } else { integer });
    if !fraction.is_empty() {
        canonical.push('.');
        canonical.push_str(fraction);
    }

    match exponent {
        Some(exp) => Decimal::from_scientific(&format!("{}e{}", canonical, exp)).ok(),
        None => Decimal::from_str(&canonical).ok(),
    }
}

/// Like [`parse_amount`], with unparsable text reading as zero.
pub fn amount_or_zero(text: &str) -> Decimal {
    parse_amount(text).unwrap_or(Decimal::ZERO)
}

/// Parse the leading signed integer of `text`.
pub fn parse_integer(text: &str) -> Option<i64> {
    LEADING_INTEGER
        .find(text.trim_start())
        .and_then(|m| m.as_str().parse().ok())
}

/// Series text as an integer when it has a numeric prefix, otherwise verbatim.
pub fn parse_series(text: &str) -> Series {
    match parse_integer(text) {
        Some(n) => Series::Number(n),
        None => Series::Text(text.trim().to_string()),
    }
}
