//! Outcome of a typed field validator.

use tracing::warn;

use silver_model::{FieldIssue, IssueKind};

/// Result of validating one normalized value.
///
/// Validators never fail: an unusable value is `Missing` (nothing to report)
/// or `Invalid` (reported as a warning), and both become null in the output.
#[derive(Debug, Clone, PartialEq)]
pub enum Validated<T> {
    Valid(T),
    /// Empty input, or a value that means "unknown".
    Missing,
    Invalid(IssueKind),
}

impl<T> Validated<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validated::Valid(_))
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Validated::Invalid(_))
    }

    /// Drops the diagnostic and keeps the value.
    pub fn value(self) -> Option<T> {
        match self {
            Validated::Valid(value) => Some(value),
            Validated::Missing | Validated::Invalid(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validated<U> {
        match self {
            Validated::Valid(value) => Validated::Valid(f(value)),
            Validated::Missing => Validated::Missing,
            Validated::Invalid(kind) => Validated::Invalid(kind),
        }
    }

    /// Keeps the value, logging and collecting the issue when invalid.
    pub fn report(self, field: &str, raw: &str, issues: &mut Vec<FieldIssue>) -> Option<T> {
        match self {
            Validated::Valid(value) => Some(value),
            Validated::Missing => None,
            Validated::Invalid(kind) => {
                warn!(field, value = raw, "{kind}");
                issues.push(FieldIssue {
                    field: field.to_string(),
                    value: raw.to_string(),
                    kind,
                });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_collects_only_invalid() {
        let mut issues = Vec::new();
        assert_eq!(Validated::Valid(3).report("f", "3", &mut issues), Some(3));
        assert_eq!(Validated::<i64>::Missing.report("f", "", &mut issues), None);
        assert!(issues.is_empty());

        let invalid = Validated::<i64>::Invalid(IssueKind::InvalidNumber);
        assert_eq!(invalid.report("f", "abc", &mut issues), None);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "f");
        assert_eq!(issues[0].value, "abc");
    }
}
