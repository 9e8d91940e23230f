//! Composite `A;B` fields.

use silver_model::IssueKind;

use super::numeric::parse_truncated;
use crate::validated::Validated;

const PAIR_SEPARATOR: char = ';';

/// Split a composite value into two integers.
///
/// Anything other than exactly two numeric parts is invalid as a whole;
/// the caller writes both output columns as null.
pub fn composite_pair(value: &str) -> Validated<(i64, i64)> {
    if value.is_empty() {
        return Validated::Missing;
    }
    let parts: Vec<&str> = value.split(PAIR_SEPARATOR).collect();
    let [first, second] = parts.as_slice() else {
        return Validated::Invalid(IssueKind::PairArity { parts: parts.len() });
    };
    match (parse_truncated(first), parse_truncated(second)) {
        (Some(a), Some(b)) => Validated::Valid((a, b)),
        _ => Validated::Invalid(IssueKind::PairPart),
    }
}
