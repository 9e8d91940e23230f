//! Run reports.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use silver_ingest::BronzeReport;
use silver_model::{Category, FieldIssue};
use silver_store::{Recovery, WriteOutcome};

/// Stage a category run has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    LedgerLoaded,
    LinesRead,
    RecordsTransformed,
    Written,
    LedgerPersisted,
}

/// How a category run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    /// No Source Table yet.
    SourceMissing,
    /// Source Table without data lines.
    SourceEmpty,
    /// Nothing new to write.
    UpToDate,
    Written,
    Failed { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub category: Category,
    pub status: RunStatus,
    /// Last state reached before the run ended.
    pub state: RunState,
    pub recovery: Recovery,
    pub lines_read: usize,
    pub already_processed: usize,
    /// Repeats of a line seen earlier in the same batch.
    pub duplicates: usize,
    pub rejected: usize,
    pub rows_written: usize,
    pub field_warnings: usize,
    pub warnings_by_field: BTreeMap<String, usize>,
    pub output: Option<WriteOutcome>,
}

impl CategoryReport {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            status: RunStatus::UpToDate,
            state: RunState::Idle,
            recovery: Recovery::Clean,
            lines_read: 0,
            already_processed: 0,
            duplicates: 0,
            rejected: 0,
            rows_written: 0,
            field_warnings: 0,
            warnings_by_field: BTreeMap::new(),
            output: None,
        }
    }

    pub fn failed(category: Category, message: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Failed {
                message: message.into(),
            },
            ..Self::new(category)
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, RunStatus::Failed { .. })
    }

    pub(crate) fn record_issues(&mut self, issues: &[FieldIssue]) {
        self.field_warnings += issues.len();
        for issue in issues {
            *self
                .warnings_by_field
                .entry(issue.field.clone())
                .or_default() += 1;
        }
    }
}

/// Outcome of a Silver run over one or more categories.
#[derive(Debug, Clone, Serialize)]
pub struct SilverReport {
    pub run_date: NaiveDate,
    pub categories: Vec<CategoryReport>,
}

impl SilverReport {
    pub fn has_failures(&self) -> bool {
        self.categories.iter().any(CategoryReport::is_failed)
    }

    pub fn rows_written(&self) -> usize {
        self.categories.iter().map(|c| c.rows_written).sum()
    }
}

/// Bronze merge followed by the Silver run.
#[derive(Debug, Clone, Serialize)]
pub struct FullRunReport {
    pub bronze: BronzeReport,
    pub silver: SilverReport,
}
