//! Field-level validation diagnostics.
//!
//! A [`FieldIssue`] never fails a record: the affected cell becomes null and
//! the issue is reported alongside the cleaned output.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a non-empty value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// Parsed, but outside the declared range.
    OutOfRange { value: i64, min: i64, max: i64 },
    /// Not a number.
    InvalidNumber,
    /// Not a plain integer.
    InvalidInteger,
    /// Not a float.
    InvalidFloat,
    /// Composite did not have exactly two parts.
    PairArity { parts: usize },
    /// Composite part was not a number.
    PairPart,
    /// Matched none of the accepted date-time layouts.
    InvalidDatetime,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::OutOfRange { value, min, max } => {
                write!(f, "out of range ({value} not in [{min}, {max}])")
            }
            IssueKind::InvalidNumber => f.write_str("invalid number"),
            IssueKind::InvalidInteger => f.write_str("invalid int"),
            IssueKind::InvalidFloat => f.write_str("invalid float"),
            IssueKind::PairArity { parts } => {
                write!(f, "invalid format (expected 'X;Y', got {parts} parts)")
            }
            IssueKind::PairPart => f.write_str("invalid number(s) in pair"),
            IssueKind::InvalidDatetime => f.write_str("invalid datetime"),
        }
    }
}

/// A value that failed validation for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub value: String,
    pub kind: IssueKind,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.field, self.kind, self.value)
    }
}
