//! Store error types.

use std::path::PathBuf;
use thiserror::Error;

use silver_model::ModelError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Temp file could not be renamed over the target.
    #[error("failed to replace {target_path} with {temp_path}: {source}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode rows for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Existing Current Table was written with different columns.
    #[error("header of {path} does not match the schema (expected '{expected}', found '{found}')")]
    HeaderMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("invalid journal {path}: {source}")]
    Journal {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Table size matches neither side of a pending commit.
    #[error(
        "pending commit {journal} cannot be resolved: {table} is {actual} bytes, expected {bytes_before} or {bytes_after}"
    )]
    JournalConflict {
        journal: PathBuf,
        table: PathBuf,
        bytes_before: u64,
        bytes_after: u64,
        actual: u64,
    },

    #[error(transparent)]
    Record(#[from] ModelError),
}

impl StoreError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
