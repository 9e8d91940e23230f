//! Pending-commit journal closing the window between the Current Table
//! append and the ledger append.
//!
//! Before rows are appended, the expected table size on both sides of the
//! append is written next to the ledger. On the next run the table size
//! tells which side the interruption happened on: the rows are either kept
//! and their fingerprints committed, or cut off so they are produced again.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::atomic::{copy_atomic, write_atomic};
use crate::error::{Result, StoreError};
use crate::fingerprint::Fingerprint;
use crate::ledger::Ledger;

const JOURNAL_SUFFIX: &str = ".pending";

/// An append that has been announced but not yet confirmed in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCommit {
    pub table: PathBuf,
    pub snapshot: PathBuf,
    pub bytes_before: u64,
    pub bytes_after: u64,
    pub fingerprints: Vec<Fingerprint>,
}

/// How a left-over journal was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Recovery {
    /// No journal was present.
    Clean,
    /// The append had completed; its fingerprints were committed.
    Committed { fingerprints: usize },
    /// The append had not completed; partial rows were cut off.
    RolledBack { fingerprints: usize, truncated: bool },
}

#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    /// Journal kept next to the given ledger file.
    pub fn for_ledger(ledger: &Path) -> Self {
        let mut name = ledger
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("ledger"));
        name.push(JOURNAL_SUFFIX);
        Self {
            path: ledger.with_file_name(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn begin(&self, commit: &PendingCommit) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(commit).map_err(|source| StoreError::Journal {
            path: self.path.clone(),
            source,
        })?;
        write_atomic(&self.path, &bytes)
    }

    pub fn load(&self) -> Result<Option<PendingCommit>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path).map_err(|e| StoreError::io("read", &self.path, e))?;
        let commit = serde_json::from_slice(&bytes).map_err(|source| StoreError::Journal {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(commit))
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io("remove", &self.path, e)),
        }
    }

    /// Resolve a left-over journal against the table it describes.
    pub fn recover(&self, ledger: &mut Ledger) -> Result<Recovery> {
        let Some(commit) = self.load()? else {
            return Ok(Recovery::Clean);
        };
        let actual = match fs::metadata(&commit.table) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(StoreError::io("inspect", &commit.table, e)),
        };
        let fingerprints = commit.fingerprints.len();

        let recovery = if actual == commit.bytes_after {
            ledger.append(&commit.fingerprints)?;
            // The snapshot copy may not have happened before the interruption.
            copy_atomic(&commit.table, &commit.snapshot)?;
            info!(
                table = %commit.table.display(),
                fingerprints,
                "completed interrupted commit"
            );
            Recovery::Committed { fingerprints }
        } else if actual == commit.bytes_before {
            info!(table = %commit.table.display(), "discarded commit that never reached the table");
            Recovery::RolledBack {
                fingerprints,
                truncated: false,
            }
        } else if actual > commit.bytes_before && actual < commit.bytes_after {
            let file = OpenOptions::new()
                .write(true)
                .open(&commit.table)
                .map_err(|e| StoreError::io("open", &commit.table, e))?;
            file.set_len(commit.bytes_before)
                .map_err(|e| StoreError::io("truncate", &commit.table, e))?;
            file.sync_all()
                .map_err(|e| StoreError::io("sync", &commit.table, e))?;
            warn!(
                table = %commit.table.display(),
                removed = actual - commit.bytes_before,
                "truncated partially written rows"
            );
            Recovery::RolledBack {
                fingerprints,
                truncated: true,
            }
        } else {
            return Err(StoreError::JournalConflict {
                journal: self.path.clone(),
                table: commit.table,
                bytes_before: commit.bytes_before,
                bytes_after: commit.bytes_after,
                actual,
            });
        };

        self.clear()?;
        Ok(recovery)
    }
}
