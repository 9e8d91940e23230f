//! Pipeline configuration.
//!
//! Every directory is resolved against `base_dir` unless it is absolute.
//! Precedence, highest first: command-line flags, the TOML file,
//! `SILVER_BASE_DIR`, built-in defaults.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use silver_ingest::BronzeOptions;
use silver_model::{DEFAULT_LEDGER_FILE_NAME, Layout};

use crate::error::{PipelineError, Result};

/// Environment variable overriding the default base directory.
pub const BASE_DIR_ENV: &str = "SILVER_BASE_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub base_dir: PathBuf,
    pub bronze_dir: PathBuf,
    pub silver_dir: PathBuf,
    /// Folder controller exports are downloaded to.
    pub export_dir: PathBuf,
    /// Scratch folder used while merging exports.
    pub temp_dir: PathBuf,
    pub ledger_file_name: String,
    /// Tracker of merged exports, kept in `base_dir`.
    pub processed_files_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_dir: base_dir_from(std::env::var_os(BASE_DIR_ENV)),
            bronze_dir: PathBuf::from("BronzeRawData"),
            silver_dir: PathBuf::from("SilverRawData"),
            export_dir: PathBuf::from("EversysDatFiles"),
            temp_dir: PathBuf::from("TempDatFiles"),
            ledger_file_name: DEFAULT_LEDGER_FILE_NAME.to_string(),
            processed_files_name: "processed_files.txt".to_string(),
        }
    }
}

fn base_dir_from(value: Option<OsString>) -> PathBuf {
    value
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
}

impl PipelineConfig {
    /// Load a TOML config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(path, &text)
    }

    pub fn from_toml(path: &Path, text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| PipelineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Resolve a configured directory against `base_dir`.
    pub fn resolve(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.base_dir.join(dir)
        }
    }

    pub fn layout(&self) -> Layout {
        Layout::new(self.resolve(&self.bronze_dir), self.resolve(&self.silver_dir))
            .with_ledger_file_name(self.ledger_file_name.clone())
    }

    pub fn bronze_options(&self, run_date: NaiveDate) -> BronzeOptions {
        BronzeOptions {
            export_dir: self.resolve(&self.export_dir),
            temp_dir: self.resolve(&self.temp_dir),
            tracker: self.base_dir.join(&self.processed_files_name),
            run_date,
        }
    }
}
