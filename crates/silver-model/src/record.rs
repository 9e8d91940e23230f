//! Typed cells and cleaned records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A typed output cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Output text of the cell.
    ///
    /// Integral numbers are written in integer form, other numbers in their
    /// shortest round-trip form, nulls as the empty string.
    pub fn to_output(&self) -> String {
        match self {
            CellValue::Int(value) => value.to_string(),
            CellValue::Float(value) => format_float(*value),
            CellValue::Text(value) => value.clone(),
            CellValue::Null => String::new(),
        }
    }
}

impl From<Option<i64>> for CellValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(CellValue::Null, CellValue::Int)
    }
}

impl From<Option<f64>> for CellValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(CellValue::Null, CellValue::Float)
    }
}

impl From<Option<String>> for CellValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(CellValue::Null, CellValue::Text)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_output())
    }
}

fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        return format!("{}", value as i64);
    }
    format!("{value}")
}

/// A raw line projected onto a category schema.
///
/// `cells` follow the schema's output column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub cells: Vec<CellValue>,
}

impl CleanedRecord {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Output text of every cell, in column order.
    pub fn to_output_row(&self) -> Vec<String> {
        self.cells.iter().map(CellValue::to_output).collect()
    }

    pub fn null_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_null()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_render_as_integers() {
        assert_eq!(CellValue::Int(30).to_output(), "30");
        assert_eq!(CellValue::Float(12.0).to_output(), "12");
        assert_eq!(CellValue::Float(-3.0).to_output(), "-3");
        assert_eq!(CellValue::Float(9.5).to_output(), "9.5");
        assert_eq!(CellValue::Float(1.25).to_output(), "1.25");
    }

    #[test]
    fn null_renders_empty() {
        assert_eq!(CellValue::Null.to_output(), "");
        assert_eq!(CellValue::from(None::<i64>), CellValue::Null);
    }

    #[test]
    fn text_is_kept() {
        assert_eq!(CellValue::Text("M-01".into()).to_output(), "M-01");
    }

    #[test]
    fn record_counts_nulls() {
        let record = CleanedRecord::new(vec![
            CellValue::Text("M1".into()),
            CellValue::Null,
            CellValue::Int(1),
            CellValue::Null,
        ]);
        assert_eq!(record.null_count(), 2);
        assert_eq!(record.to_output_row(), vec!["M1", "", "1", ""]);
    }
}
