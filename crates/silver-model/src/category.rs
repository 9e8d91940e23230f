//! Telemetry categories produced by the machine controllers.
//!
//! Every category owns one Source Table, one Dedup Ledger, one Current Table
//! and one dated History Snapshot per run day. The set is fixed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// A dataset category exported by the coffee-machine controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Milk system and powder cleaning cycles.
    Cleaning,
    /// Informational messages raised by the controller.
    Info,
    /// Beverage products brewed by the machine.
    Product,
    /// Rinse cycles of the brewing units and milk nozzles.
    Rinse,
}

impl Category {
    /// All categories in processing order.
    pub const ALL: [Category; 4] = [
        Category::Cleaning,
        Category::Info,
        Category::Product,
        Category::Rinse,
    ];

    /// Returns the canonical category name used in directory and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cleaning => "Cleaning",
            Category::Info => "Info",
            Category::Product => "Product",
            Category::Rinse => "Rinse",
        }
    }

    /// File name of the merged Source Table, e.g. `Cleaning.dat`.
    pub fn source_file_name(&self) -> String {
        format!("{}.dat", self.as_str())
    }

    /// File name of the Current Table and History Snapshot, e.g. `Silver_Cleaning.dat`.
    pub fn output_file_name(&self) -> String {
        format!("Silver_{}.dat", self.as_str())
    }

    /// Suffix a controller export carries for this category.
    ///
    /// Export files are named `<machine>-<timestamp>-<suffix>.dat`.
    pub fn export_suffix(&self) -> &'static str {
        match self {
            Category::Cleaning => "Cleaning_History",
            Category::Info => "Info_Message_History",
            Category::Product => "Product_History",
            Category::Rinse => "Rinse_History",
        }
    }

    /// Resolves an export suffix back to its category.
    pub fn from_export_suffix(suffix: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|category| category.export_suffix() == suffix)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = ModelError;

    /// Parse a category name (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "cleaning" => Ok(Category::Cleaning),
            "info" => Ok(Category::Info),
            "product" => Ok(Category::Product),
            "rinse" => Ok(Category::Rinse),
            _ => Err(ModelError::UnknownCategory(s.to_string())),
        }
    }
}
