//! Per-category field schemas.
//!
//! A [`Schema`] lists the raw columns a category reads, in output order, and
//! the [`FieldRule`] applied to each. Composite pair fields expand into two
//! output columns suffixed `_1` and `_2`.

use serde::Serialize;

use crate::category::Category;
use crate::error::{ModelError, Result};
use crate::record::CleanedRecord;
use crate::rule::{FieldRule, UNMEASURED_SENTINEL};

/// One raw column consumed by a schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    /// Column name in the Source Table header.
    pub name: &'static str,
    /// Rule converting the raw value.
    pub rule: FieldRule,
}

impl FieldSpec {
    pub const fn new(name: &'static str, rule: FieldRule) -> Self {
        Self { name, rule }
    }

    /// Output column names produced by this field.
    pub fn output_columns(&self) -> Vec<String> {
        match self.rule {
            FieldRule::Pair => vec![format!("{}_1", self.name), format!("{}_2", self.name)],
            _ => vec![self.name.to_string()],
        }
    }
}

/// Declared field list of a category.
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    pub category: Category,
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    /// Returns the declared schema for a category.
    pub fn for_category(category: Category) -> Self {
        let fields = match category {
            Category::Cleaning => cleaning_fields(),
            Category::Info => info_fields(),
            Category::Product => product_fields(),
            Category::Rinse => rinse_fields(),
        };
        Self { category, fields }
    }

    /// Output header of the Current Table, in order.
    pub fn output_columns(&self) -> Vec<String> {
        self.fields
            .iter()
            .flat_map(FieldSpec::output_columns)
            .collect()
    }

    /// Number of output columns.
    pub fn output_width(&self) -> usize {
        self.fields.iter().map(|field| field.rule.width()).sum()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Checks that a record carries exactly one cell per output column.
    pub fn check_record(&self, record: &CleanedRecord) -> Result<()> {
        let expected = self.output_width();
        if record.cells.len() != expected {
            return Err(ModelError::RecordWidth {
                category: self.category.to_string(),
                expected,
                actual: record.cells.len(),
            });
        }
        Ok(())
    }
}

fn cleaning_fields() -> Vec<FieldSpec> {
    use FieldRule::{Binary, Number, Pair, RangeInteger, Text, Timestamp};
    vec![
        FieldSpec::new("machine_id", Text),
        FieldSpec::new("timestamp_start", Timestamp),
        FieldSpec::new("timestamp_end", Timestamp),
        FieldSpec::new("powder_clean_status", RangeInteger { min: 0, max: 4 }),
        FieldSpec::new("tabs_status_left", RangeInteger { min: 0, max: 7 }),
        FieldSpec::new("tabs_status_right", RangeInteger { min: 0, max: 7 }),
        FieldSpec::new("detergent_status_left", RangeInteger { min: 0, max: 9 }),
        FieldSpec::new("detergent_status_right", RangeInteger { min: 0, max: 9 }),
        FieldSpec::new("milk_pump_error_left", Binary),
        FieldSpec::new("milk_pump_error_right", Binary),
        FieldSpec::new("milk_temp_left_1", Number),
        FieldSpec::new("milk_temp_left_2", Number),
        FieldSpec::new("milk_temp_right_1", Number),
        FieldSpec::new("milk_temp_right_2", Number),
        FieldSpec::new("milk_rpm_left_1", Number),
        FieldSpec::new("milk_rpm_left_2", Number),
        FieldSpec::new("milk_rpm_right_1", Number),
        FieldSpec::new("milk_rpm_right_2", Number),
        FieldSpec::new("milk_clean_temp_left", Pair),
        FieldSpec::new("milk_clean_temp_right", Pair),
        FieldSpec::new("milk_clean_rpm_left", Pair),
        FieldSpec::new("milk_clean_rpm_right", Pair),
        FieldSpec::new("milk_seq_cycle_left", Pair),
        FieldSpec::new("milk_seq_cycle_right", Pair),
    ]
}

fn info_fields() -> Vec<FieldSpec> {
    use FieldRule::{StrictInteger, Text, Timestamp};
    vec![
        FieldSpec::new("machine_id", Text),
        FieldSpec::new("timestamp", Timestamp),
        FieldSpec::new("number", Text),
        FieldSpec::new("typography", Text),
        FieldSpec::new("type_number", StrictInteger),
    ]
}

// machine_id is numeric here, unlike the other categories.
fn product_fields() -> Vec<FieldSpec> {
    use FieldRule::{Decimal, Number, Timestamp};
    vec![
        FieldSpec::new("machine_id", Number),
        FieldSpec::new("timestamp", Timestamp),
        FieldSpec::new("press_before", Decimal),
        FieldSpec::new("press_after", Decimal),
        FieldSpec::new("press_final", Decimal),
        FieldSpec::new("grind_time", Decimal),
        FieldSpec::new("ext_time", Decimal),
        FieldSpec::new("water_qnty", Number),
        FieldSpec::new("water_temp", Number),
        FieldSpec::new("prod_type", Number),
        FieldSpec::new("double_prod", Number),
        FieldSpec::new("bean_hopper", Number),
        FieldSpec::new("outlet_side", Number),
        FieldSpec::new("stopped", Number),
        FieldSpec::new("milk_temp", Number),
        FieldSpec::new("steam_pressure", Decimal),
        FieldSpec::new("grind_adjust_left", Number),
        FieldSpec::new("grind_adjust_right", Number),
        FieldSpec::new("milk_time", Decimal),
        FieldSpec::new("boiler_temp", Number),
    ]
}

fn rinse_fields() -> Vec<FieldSpec> {
    use FieldRule::{RangeInteger, SentinelInteger, Text, Timestamp};
    let unmeasured = SentinelInteger {
        sentinel: UNMEASURED_SENTINEL,
    };
    vec![
        FieldSpec::new("machine_id", Text),
        FieldSpec::new("timestamp", Timestamp),
        FieldSpec::new("rinse_type", RangeInteger { min: 0, max: 255 }),
        FieldSpec::new("flow_rate_left", unmeasured),
        FieldSpec::new("flow_rate_right", unmeasured),
        FieldSpec::new("status_left", RangeInteger { min: 0, max: 6 }),
        FieldSpec::new("status_right", RangeInteger { min: 0, max: 6 }),
        FieldSpec::new("pump_pressure", RangeInteger { min: 0, max: 1000 }),
        FieldSpec::new("nozzle_flow_rate_left", unmeasured),
        FieldSpec::new("nozzle_flow_rate_right", unmeasured),
        FieldSpec::new("nozzle_status_left", RangeInteger { min: 0, max: 255 }),
        FieldSpec::new("nozzle_status_right", RangeInteger { min: 0, max: 255 }),
    ]
}
