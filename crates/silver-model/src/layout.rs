//! On-disk layout of the Bronze and Silver layers.
//!
//! ```text
//! <bronze>/<C>/current/<C>.dat                 source table
//! <bronze>/<C>/current/cleaned_lines.txt       dedup ledger
//! <bronze>/<C>/<YYYY>/<MM>/<DD>/<C>.dat        bronze backup
//! <silver>/<C>/current/Silver_<C>.dat          current table
//! <silver>/<C>/<YYYY>/<MM>/<DD>/Silver_<C>.dat history snapshot
//! ```

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Default name of the per-category dedup ledger.
pub const DEFAULT_LEDGER_FILE_NAME: &str = "cleaned_lines.txt";

const CURRENT_DIR: &str = "current";

/// Resolved directory roots of both layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub bronze_root: PathBuf,
    pub silver_root: PathBuf,
    pub ledger_file_name: String,
}

impl Layout {
    pub fn new(bronze_root: impl Into<PathBuf>, silver_root: impl Into<PathBuf>) -> Self {
        Self {
            bronze_root: bronze_root.into(),
            silver_root: silver_root.into(),
            ledger_file_name: DEFAULT_LEDGER_FILE_NAME.to_string(),
        }
    }

    #[must_use]
    pub fn with_ledger_file_name(mut self, name: impl Into<String>) -> Self {
        self.ledger_file_name = name.into();
        self
    }

    pub fn bronze_category_dir(&self, category: Category) -> PathBuf {
        self.bronze_root.join(category.as_str())
    }

    pub fn bronze_current_dir(&self, category: Category) -> PathBuf {
        self.bronze_category_dir(category).join(CURRENT_DIR)
    }

    /// Merged Source Table read by the Silver stage.
    pub fn source_table(&self, category: Category) -> PathBuf {
        self.bronze_current_dir(category)
            .join(category.source_file_name())
    }

    /// Dated copy of the Source Table kept by the Bronze merge.
    pub fn bronze_backup(&self, category: Category, date: NaiveDate) -> PathBuf {
        dated_dir(&self.bronze_category_dir(category), date).join(category.source_file_name())
    }

    pub fn ledger(&self, category: Category) -> PathBuf {
        self.bronze_current_dir(category)
            .join(&self.ledger_file_name)
    }

    pub fn silver_category_dir(&self, category: Category) -> PathBuf {
        self.silver_root.join(category.as_str())
    }

    pub fn current_table(&self, category: Category) -> PathBuf {
        self.silver_category_dir(category)
            .join(CURRENT_DIR)
            .join(category.output_file_name())
    }

    pub fn history_snapshot(&self, category: Category, date: NaiveDate) -> PathBuf {
        dated_dir(&self.silver_category_dir(category), date).join(category.output_file_name())
    }
}

/// `<root>/<YYYY>/<MM>/<DD>`
pub fn dated_dir(root: &Path, date: NaiveDate) -> PathBuf {
    root.join(format!("{:04}", date.year()))
        .join(format!("{:02}", date.month()))
        .join(format!("{:02}", date.day()))
}
