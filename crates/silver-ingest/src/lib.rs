//! Ingestion for the Silver pipeline.
//!
//! - **source**: reading the merged Source Table line by line
//! - **discovery**: locating controller exports and matching categories
//! - **bronze**: merging exports into Source Tables with dated backups

pub mod bronze;
pub mod discovery;
pub mod error;
pub mod source;

pub use bronze::{
    BronzeOptions, BronzeReport, FailedExport, MergedExport, ProcessedFiles, backup_source_table,
    ensure_current_files, merge_exports,
};
pub use discovery::{export_category, list_export_files};
pub use error::{IngestError, Result};
pub use source::{
    DELIMITER, RawLine, SourceRead, SourceTable, parse_source_text, read_source_table,
    split_fields,
};
