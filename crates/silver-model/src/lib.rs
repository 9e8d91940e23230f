//! Data model of the Silver layer.
//!
//! - **category**: the fixed set of telemetry categories and their file names
//! - **layout**: directory conventions of the Bronze and Silver layers
//! - **rule**: declarative field rules
//! - **schema**: per-category field lists and output columns
//! - **record**: typed cells and cleaned records
//! - **issue**: field-level validation diagnostics

pub mod category;
pub mod error;
pub mod issue;
pub mod layout;
pub mod record;
pub mod rule;
pub mod schema;

pub use category::Category;
pub use error::{ModelError, Result};
pub use issue::{FieldIssue, IssueKind};
pub use layout::{DEFAULT_LEDGER_FILE_NAME, Layout, dated_dir};
pub use record::{CellValue, CleanedRecord};
pub use rule::{FieldRule, UNMEASURED_SENTINEL};
pub use schema::{FieldSpec, Schema};
