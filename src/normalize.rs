// 🧮 Value Normalizers
// Raw text cells → integer-scaled quantities (cents, ten-thousandths of a share)

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

// ============================================================================
// SCALE CONSTANTS
// ============================================================================

/// Share counts are stored as ten-thousandths of a share (4 decimal digits)
pub const SHARE_SCALE: i64 = 10_000;

/// Currency amounts are stored in minor units (cents)
pub const CURRENCY_SCALE: i64 = 100;

/// Currency symbols stripped before parsing an amount
const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥'];

// ============================================================================
// CELL CLEANING
// ============================================================================

/// Strip embedded quote characters and surrounding whitespace.
///
/// Missing cells (rows shorter than the header) clean to an empty string.
pub fn clean_cell(text: Option<&str>) -> String {
    match text {
        Some(t) => t.replace('"', "").trim().to_string(),
        None => String::new(),
    }
}

/// Uppercase and trim a ticker symbol. Idempotent.
pub fn normalize_ticker(text: &str) -> String {
    text.to_uppercase().trim().to_string()
}

// ============================================================================
// NUMERIC PARSING
// ============================================================================

/// Parse a share quantity into ten-thousandths of a share.
///
/// "1,234.56" → 12345600. Unparseable input yields 0, which makes the
/// row fail the `shares > 0` check downstream.
pub fn parse_share_quantity(text: &str) -> i64 {
    let cleaned: String = text.chars().filter(|c| *c != ',' && *c != '"').collect();

    leading_decimal(cleaned.trim(), true)
        .map(|value| scale(value, SHARE_SCALE))
        .unwrap_or(0)
}

/// Parse a currency amount into minor units (cents).
///
/// Accepts `$ € £ ¥`, thousands separators, and three sign notations:
/// "($500.00)", "-$500.00" and "$500.00". Unparseable input yields 0.
pub fn parse_currency_amount(text: &str) -> i64 {
    let cleaned: String = text
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && *c != '"' && !c.is_whitespace())
        .collect();

    let (negative, digits) = if cleaned.len() >= 2 && cleaned.starts_with('(') && cleaned.ends_with(')') {
        (true, &cleaned[1..cleaned.len() - 1])
    } else if let Some(rest) = cleaned.strip_prefix('-') {
        (true, rest)
    } else {
        // Fidelity prints gains as "+$560.50"
        (false, cleaned.strip_prefix('+').unwrap_or(&cleaned))
    };

    let amount = leading_decimal(digits, false)
        .map(|value| scale(value, CURRENCY_SCALE))
        .unwrap_or(0);

    if negative {
        -amount
    } else {
        amount
    }
}

/// Read the leading decimal number of `text` ("50 shares" → 50).
///
/// Returns None when no digit is found before the first non-numeric char.
fn leading_decimal(text: &str, signed: bool) -> Option<Decimal> {
    let mut chars = text.chars().peekable();
    let mut number = String::new();

    if signed {
        if let Some(&sign) = chars.peek() {
            if sign == '-' || sign == '+' {
                number.push(sign);
                chars.next();
            }
        }
    }

    let mut integer = String::new();
    let mut fraction = String::new();
    let mut seen_dot = false;

    for c in chars {
        match c {
            '0'..='9' if seen_dot => fraction.push(c),
            '0'..='9' => integer.push(c),
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
    }

    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    number.push_str(if integer.is_empty() { "0" } else { &integer });
    if !fraction.is_empty() {
        number.push('.');
        number.push_str(&fraction);
    }

    Decimal::from_str(&number).ok()
}

/// Multiply by a scale factor and round half away from zero.
fn scale(value: Decimal, factor: i64) -> i64 {
    value
        .checked_mul(Decimal::from(factor))
        .and_then(|scaled| {
            scaled
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        })
        .unwrap_or(0)
}

// ============================================================================
// SCALE CONVERSIONS
// ============================================================================
// costBasis is in cents, shares in ten-thousandths, costPerShare in cents
// per whole share. All cross-scale arithmetic goes through these two.

/// Total cost (cents) from a per-share cost (cents) and a scaled share count.
pub fn cost_basis_from_per_share(cost_per_share: i64, shares: i64) -> i64 {
    div_round(cost_per_share as i128 * shares as i128, SHARE_SCALE as i128)
}

/// Per-share cost (cents) from a total cost (cents) and a scaled share count.
///
/// Returns 0 when `shares` is 0.
pub fn cost_per_share_from_basis(cost_basis: i64, shares: i64) -> i64 {
    if shares == 0 {
        return 0;
    }
    div_round(cost_basis as i128 * SHARE_SCALE as i128, shares as i128)
}

fn div_round(numerator: i128, denominator: i128) -> i64 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;

    let rounded = if remainder.abs() * 2 >= denominator.abs() {
        quotient + numerator.signum() * denominator.signum()
    } else {
        quotient
    };

    i64::try_from(rounded).unwrap_or(if rounded < 0 { i64::MIN } else { i64::MAX })
}

// ============================================================================
// TESTS
// ============================================================================
