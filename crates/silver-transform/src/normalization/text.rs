//! Raw value normalization.

use std::fmt;

/// Strip quoting artifacts and control characters, then trim.
///
/// Never fails; any input degrades to its best-effort cleaned text.
///
/// # Examples
///
/// ```
/// use silver_transform::normalization::normalize_value;
///
/// assert_eq!(normalize_value("  \"M-01\"\r\n"), "M-01");
/// assert_eq!(normalize_value("it's"), "its");
/// ```
pub fn normalize_value(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_control() && *ch != '"' && *ch != '\'')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Normalize any displayable scalar.
pub fn normalize_display(value: &dyn fmt::Display) -> String {
    normalize_value(&value.to_string())
}
