//! Numeric field validators.
//!
//! All take an already normalized value. Empty input is always `Missing`
//! and never reported.

use silver_model::IssueKind;

use crate::validated::Validated;

// i64 covers (-2^63, 2^63); anything outside cannot be truncated safely.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Parses a float; non-finite values are rejected.
pub fn parse_f64(value: &str) -> Option<f64> {
    let parsed = value.trim().parse::<f64>().ok()?;
    parsed.is_finite().then_some(parsed)
}

/// Parses a float and truncates it towards zero.
pub fn parse_truncated(value: &str) -> Option<i64> {
    let parsed = parse_f64(value)?.trunc();
    (parsed > -I64_LIMIT && parsed < I64_LIMIT).then_some(parsed as i64)
}

/// Integer within `[min, max]`, parsed float-then-truncate.
///
/// ```
/// use silver_transform::normalization::range_integer;
/// use silver_transform::Validated;
///
/// assert_eq!(range_integer("2.0", 0, 4), Validated::Valid(2));
/// assert!(range_integer("7", 0, 4).is_invalid());
/// assert_eq!(range_integer("", 0, 4), Validated::Missing);
/// ```
pub fn range_integer(value: &str, min: i64, max: i64) -> Validated<i64> {
    if value.is_empty() {
        return Validated::Missing;
    }
    match parse_truncated(value) {
        Some(parsed) if (min..=max).contains(&parsed) => Validated::Valid(parsed),
        Some(parsed) => Validated::Invalid(IssueKind::OutOfRange {
            value: parsed,
            min,
            max,
        }),
        None => Validated::Invalid(IssueKind::InvalidNumber),
    }
}

/// Flag restricted to 0 or 1.
pub fn binary_flag(value: &str) -> Validated<i64> {
    range_integer(value, 0, 1)
}

/// Integer where `sentinel` encodes "not measured".
pub fn sentinel_integer(value: &str, sentinel: i64) -> Validated<i64> {
    match plain_number(value) {
        Validated::Valid(parsed) if parsed == sentinel => Validated::Missing,
        other => other,
    }
}

/// Unbounded integer, parsed float-then-truncate.
pub fn plain_number(value: &str) -> Validated<i64> {
    if value.is_empty() {
        return Validated::Missing;
    }
    match parse_truncated(value) {
        Some(parsed) => Validated::Valid(parsed),
        None => Validated::Invalid(IssueKind::InvalidNumber),
    }
}

/// Integer written as plain digits; `2.0` is rejected.
pub fn strict_integer(value: &str) -> Validated<i64> {
    if value.is_empty() {
        return Validated::Missing;
    }
    match value.trim().parse::<i64>() {
        Ok(parsed) => Validated::Valid(parsed),
        Err(_) => Validated::Invalid(IssueKind::InvalidInteger),
    }
}

/// Float rounded to two decimal places.
pub fn fixed_precision(value: &str) -> Validated<f64> {
    if value.is_empty() {
        return Validated::Missing;
    }
    match parse_f64(value) {
        Some(parsed) => Validated::Valid(round_to(parsed, 2)),
        None => Validated::Invalid(IssueKind::InvalidFloat),
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() { rounded } else { value }
}
