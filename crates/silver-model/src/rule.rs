//! Declarative validation rules attached to schema fields.

use serde::{Deserialize, Serialize};

/// Hardware code meaning "not measured" on flow-rate sensors.
pub const UNMEASURED_SENTINEL: i64 = 65535;

/// How a raw field is turned into a typed cell.
///
/// Rules are data, not code: the transform engine dispatches on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FieldRule {
    /// Normalized text kept verbatim.
    Text,
    /// Float-then-truncate integer that must fall within `[min, max]`.
    RangeInteger { min: i64, max: i64 },
    /// Range integer restricted to `[0, 1]`.
    Binary,
    /// Float-then-truncate integer where `sentinel` means unknown.
    SentinelInteger { sentinel: i64 },
    /// Float-then-truncate integer without bounds.
    Number,
    /// Plain integer text, no decimal point accepted.
    StrictInteger,
    /// Float rounded to two decimal places.
    Decimal,
    /// `A;B` composite decomposed into two integer columns.
    Pair,
    /// Date-time accepted in any supported layout, written canonically.
    Timestamp,
}

impl FieldRule {
    /// Number of output columns this rule produces.
    pub fn width(&self) -> usize {
        match self {
            FieldRule::Pair => 2,
            _ => 1,
        }
    }

    /// Short label used in listings.
    pub fn label(&self) -> String {
        match self {
            FieldRule::Text => "text".to_string(),
            FieldRule::RangeInteger { min, max } => format!("integer [{min}, {max}]"),
            FieldRule::Binary => "flag [0, 1]".to_string(),
            FieldRule::SentinelInteger { sentinel } => format!("integer (null = {sentinel})"),
            FieldRule::Number => "number".to_string(),
            FieldRule::StrictInteger => "strict integer".to_string(),
            FieldRule::Decimal => "decimal(2)".to_string(),
            FieldRule::Pair => "pair A;B".to_string(),
            FieldRule::Timestamp => "timestamp".to_string(),
        }
    }
}
