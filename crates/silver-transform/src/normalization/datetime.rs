//! Multi-format timestamp parsing.
//!
//! Controllers export either ISO-like or US-style timestamps; both are
//! rewritten to the canonical layout.

use chrono::NaiveDateTime;

use silver_model::IssueKind;

use crate::validated::Validated;

/// Layout every timestamp is written in.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accepted input layouts, tried in order.
pub const ACCEPTED_FORMATS: [&str; 2] = [CANONICAL_FORMAT, "%m/%d/%Y %H:%M:%S"];

/// Parse a timestamp against [`ACCEPTED_FORMATS`]; first match wins.
pub fn parse_timestamp(value: &str) -> Validated<NaiveDateTime> {
    if value.is_empty() {
        return Validated::Missing;
    }
    ACCEPTED_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map_or(Validated::Invalid(IssueKind::InvalidDatetime), Validated::Valid)
}

/// Parse and re-serialise a timestamp in [`CANONICAL_FORMAT`].
pub fn normalize_timestamp(value: &str) -> Validated<String> {
    parse_timestamp(value).map(|parsed| parsed.format(CANONICAL_FORMAT).to_string())
}
