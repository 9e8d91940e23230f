//! Schema-driven record transform.
//!
//! A [`SchemaTransform`] binds a category [`Schema`] to the header of one
//! Source Table, resolving every declared field to its column position once.
//! Each data line then either passes the structural gate and becomes a
//! [`CleanedRecord`], or is rejected untouched so it can be retried later.

use tracing::{debug, warn};

use silver_ingest::RawLine;
use silver_model::{CellValue, CleanedRecord, FieldIssue, FieldRule, Schema};

use crate::error::{Result, TransformError};
use crate::normalization::{
    binary_flag, composite_pair, fixed_precision, normalize_timestamp, normalize_value,
    plain_number, range_integer, sentinel_integer, strict_integer,
};

/// Schema bound to a concrete header.
#[derive(Debug, Clone)]
pub struct SchemaTransform {
    schema: Schema,
    positions: Vec<usize>,
    header_len: usize,
}

/// A line that passed the structural gate.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedLine {
    pub record: CleanedRecord,
    pub issues: Vec<FieldIssue>,
}

/// A line with fewer fields than the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub line_number: usize,
    pub expected: usize,
    pub actual: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Accepted(TransformedLine),
    Rejected(Rejection),
}

impl SchemaTransform {
    /// Resolve every schema field against `header`.
    ///
    /// When a name appears twice the last occurrence wins, as it would in a
    /// keyed row built from the header.
    pub fn bind(schema: Schema, header: &[String]) -> Result<Self> {
        if header.iter().all(|name| name.is_empty()) {
            return Err(TransformError::EmptyHeader {
                category: schema.category.to_string(),
            });
        }
        let mut positions = Vec::with_capacity(schema.fields.len());
        for field in &schema.fields {
            let position = header
                .iter()
                .rposition(|name| name == field.name)
                .ok_or_else(|| TransformError::MissingColumn {
                    category: schema.category.to_string(),
                    column: field.name.to_string(),
                })?;
            positions.push(position);
        }
        Ok(Self {
            schema,
            positions,
            header_len: header.len(),
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Transform one line.
    ///
    /// When an unterminated quote leaves the quote-aware split short, a plain
    /// `;` split is tried before the line is rejected.
    pub fn apply(&self, line: &RawLine) -> LineOutcome {
        let plain;
        let fields = if line.fields.len() < self.header_len && line.has_open_quote() {
            plain = line.plain_fields();
            debug!(
                line_number = line.number,
                quoted = line.fields.len(),
                plain = plain.len(),
                "retrying short line with plain split"
            );
            &plain
        } else {
            &line.fields
        };
        if fields.len() < self.header_len {
            warn!(
                line_number = line.number,
                expected = self.header_len,
                actual = fields.len(),
                line = %line.text,
                "line skipped due to missing fields"
            );
            return LineOutcome::Rejected(Rejection {
                line_number: line.number,
                expected: self.header_len,
                actual: fields.len(),
            });
        }

        let mut cells = Vec::with_capacity(self.schema.output_width());
        let mut issues = Vec::new();
        for (field, &position) in self.schema.fields.iter().zip(&self.positions) {
            let raw = &fields[position];
            apply_rule(field.rule, field.name, raw, &mut cells, &mut issues);
        }
        if !issues.is_empty() {
            debug!(
                line_number = line.number,
                issues = issues.len(),
                "line cleaned with field warnings"
            );
        }
        LineOutcome::Accepted(TransformedLine {
            record: CleanedRecord::new(cells),
            issues,
        })
    }
}

/// Convert one raw value according to `rule`, pushing one cell per output column.
pub fn apply_rule(
    rule: FieldRule,
    field: &str,
    raw: &str,
    cells: &mut Vec<CellValue>,
    issues: &mut Vec<FieldIssue>,
) {
    let value = normalize_value(raw);
    match rule {
        FieldRule::Text => cells.push(CellValue::Text(value)),
        FieldRule::RangeInteger { min, max } => {
            cells.push(range_integer(&value, min, max).report(field, &value, issues).into());
        }
        FieldRule::Binary => cells.push(binary_flag(&value).report(field, &value, issues).into()),
        FieldRule::SentinelInteger { sentinel } => cells.push(
            sentinel_integer(&value, sentinel)
                .report(field, &value, issues)
                .into(),
        ),
        FieldRule::Number => cells.push(plain_number(&value).report(field, &value, issues).into()),
        FieldRule::StrictInteger => {
            cells.push(strict_integer(&value).report(field, &value, issues).into());
        }
        FieldRule::Decimal => {
            cells.push(fixed_precision(&value).report(field, &value, issues).into());
        }
        FieldRule::Pair => {
            let (first, second) = composite_pair(&value)
                .report(field, &value, issues)
                .unzip();
            cells.push(first.into());
            cells.push(second.into());
        }
        FieldRule::Timestamp => {
            cells.push(normalize_timestamp(&value).report(field, &value, issues).into());
        }
    }
}
