//! # Amount Parsing and Formatting
//!
//! Ingredient amounts are stored as free text. This module turns that text into
//! a number that can be summed, and turns sums back into the kind of quantity a
//! person would write on a shopping list.
//!
//! ## Parsing
//!
//! [`parse_amount`] never fails. It tries, in order:
//!
//! - mixed numbers ("1 1/2")
//! - simple fractions ("3/4")
//! - the first number embedded in the text ("2-3 cups" -> 2, "1.5kg" -> 1.5)
//!
//! and falls back to `0.0` when nothing matches.
//!
//! ## Formatting
//!
//! [`format_amount`] snaps values within `0.01` of a common kitchen fraction to
//! that fraction, and otherwise prints a trimmed decimal.
//!
//! ```rust
//! use recipe_manager::amount::{format_amount, parse_amount};
//!
//! let total = parse_amount("1") + parse_amount("1/2");
//! assert_eq!(format_amount(total), "1 1/2");
//! ```

use lazy_static::lazy_static;
use log::trace;
use regex::Regex;

/// Tolerance used when snapping a value to a canonical fraction
pub const FRACTION_TOLERANCE: f64 = 0.01;

/// Canonical fractions, checked in this order
pub const COMMON_FRACTIONS: [(f64, &str); 9] = [
    (0.125, "1/8"),
    (0.25, "1/4"),
    (0.333, "1/3"),
    (0.375, "3/8"),
    (0.5, "1/2"),
    (0.625, "5/8"),
    (0.666, "2/3"),
    (0.75, "3/4"),
    (0.875, "7/8"),
];

// First run of ASCII digits with at most one decimal point
const EMBEDDED_NUMBER_PATTERN: &str = r"[0-9]*\.?[0-9]+";

lazy_static! {
    static ref EMBEDDED_NUMBER_REGEX: Regex =
        Regex::new(EMBEDDED_NUMBER_PATTERN).expect("Embedded number pattern should be valid");
}

/// Outcome of one step in the parsing chain
#[derive(Debug, Clone, Copy, PartialEq)]
enum Parsed {
    /// The step recognised the text and produced a value
    Value(f64),
    /// The step recognised a fraction whose denominator is zero
    ZeroDenominator,
}

/// Parse a free-form amount into a number.
///
/// Unparseable input, including empty text and fractions with a zero
/// denominator, yields `0.0`.
///
/// # Examples
///
/// ```rust
/// use recipe_manager::amount::parse_amount;
///
/// assert_eq!(parse_amount("1 1/2"), 1.5);
/// assert_eq!(parse_amount("3/4"), 0.75);
/// assert_eq!(parse_amount("2-3 cups"), 2.0);
/// assert_eq!(parse_amount("a pinch"), 0.0);
/// ```
pub fn parse_amount(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }

    let parsed = parse_mixed_number(text)
        .or_else(|| parse_simple_fraction(text))
        .or_else(|| parse_embedded_number(text).map(Parsed::Value));

    match parsed {
        Some(Parsed::Value(value)) => value,
        Some(Parsed::ZeroDenominator) => {
            trace!("Amount '{}' has a zero denominator, counting it as 0", text);
            0.0
        }
        None => {
            trace!("Amount '{}' is not numeric, counting it as 0", text);
            0.0
        }
    }
}

/// Parse an optional amount, treating a missing value as zero
pub fn parse_optional_amount(text: Option<&str>) -> f64 {
    text.map(parse_amount).unwrap_or(0.0)
}

/// "<whole> <num>/<den>", only attempted when the text has both whitespace and a slash
fn parse_mixed_number(text: &str) -> Option<Parsed> {
    if !text.contains('/') || !text.contains(char::is_whitespace) {
        return None;
    }

    let mut tokens = text.split_whitespace();
    let whole = parse_float(tokens.next()?)?;
    let (numerator, denominator) = split_fraction(tokens.next()?)?;

    if denominator == 0.0 {
        return Some(Parsed::ZeroDenominator);
    }

    Some(Parsed::Value(whole + numerator / denominator))
}

/// "<num>/<den>" with exactly one slash
fn parse_simple_fraction(text: &str) -> Option<Parsed> {
    let (numerator, denominator) = split_fraction(text)?;

    if denominator == 0.0 {
        return Some(Parsed::ZeroDenominator);
    }

    Some(Parsed::Value(numerator / denominator))
}

fn parse_embedded_number(text: &str) -> Option<f64> {
    let found = EMBEDDED_NUMBER_REGEX.find(text)?;
    parse_float(found.as_str())
}

fn split_fraction(text: &str) -> Option<(f64, f64)> {
    let mut parts = text.split('/');
    let numerator = parts.next()?;
    let denominator = parts.next()?;

    if parts.next().is_some() {
        return None;
    }

    Some((parse_float(numerator)?, parse_float(denominator)?))
}

fn parse_float(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

/// Format a summed amount for display.
///
/// # Examples
///
/// ```rust
/// use recipe_manager::amount::format_amount;
///
/// assert_eq!(format_amount(0.0), "0");
/// assert_eq!(format_amount(0.5), "1/2");
/// assert_eq!(format_amount(2.25), "2 1/4");
/// assert_eq!(format_amount(3.0), "3");
/// assert_eq!(format_amount(4.1), "4.1");
/// ```
pub fn format_amount(amount: f64) -> String {
    if amount == 0.0 {
        return "0".to_string();
    }

    if let Some(fraction) = snap_to_fraction(amount) {
        return fraction.to_string();
    }

    if amount > 1.0 {
        let whole = amount.trunc();
        if let Some(fraction) = snap_to_fraction(amount - whole) {
            return format!("{:.0} {}", whole, fraction);
        }
    }

    if amount == amount.trunc() {
        return format!("{:.0}", amount);
    }

    let decimal = format!("{:.2}", amount);
    decimal.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn snap_to_fraction(value: f64) -> Option<&'static str> {
    COMMON_FRACTIONS
        .iter()
        .find(|(fraction_value, _)| (value - fraction_value).abs() < FRACTION_TOLERANCE)
        .map(|(_, label)| *label)
}
