//! Bronze merge: fold controller DAT exports into per-category Source Tables.
//!
//! Each export is parsed, re-serialised through a temp file and appended to
//! `<bronze>/<C>/current/<C>.dat`. The merged table is then copied into the
//! dated backup folder and the export is recorded in the processed-files
//! tracker so it is never merged twice.

use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use silver_model::{Category, Layout};

use crate::discovery::{export_category, list_export_files};
use crate::error::{IngestError, Result};
use crate::source::DELIMITER;

/// Locations used by the Bronze merge besides the layer layout.
#[derive(Debug, Clone)]
pub struct BronzeOptions {
    /// Folder the controller exports land in.
    pub export_dir: PathBuf,
    /// Scratch folder for re-serialised exports.
    pub temp_dir: PathBuf,
    /// Append-only list of already merged export file names.
    pub tracker: PathBuf,
    /// Date keying the backup folder.
    pub run_date: NaiveDate,
}

/// An export merged during this run.
#[derive(Debug, Clone, Serialize)]
pub struct MergedExport {
    pub file_name: String,
    pub category: Category,
    pub rows: usize,
    pub target: PathBuf,
    pub backup: PathBuf,
}

/// An export that could not be merged; it will be retried next run.
#[derive(Debug, Clone, Serialize)]
pub struct FailedExport {
    pub file_name: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BronzeReport {
    pub export_dir_missing: bool,
    pub already_processed: usize,
    pub merged: Vec<MergedExport>,
    pub unrecognized: Vec<String>,
    pub empty: Vec<String>,
    pub failed: Vec<FailedExport>,
    pub placeholders: Vec<PathBuf>,
}

impl BronzeReport {
    pub fn merged_rows(&self) -> usize {
        self.merged.iter().map(|export| export.rows).sum()
    }
}

/// Set of export file names already merged.
#[derive(Debug)]
pub struct ProcessedFiles {
    path: PathBuf,
    names: BTreeSet<String>,
}

impl ProcessedFiles {
    /// Load the tracker, creating an empty one when absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| IngestError::write("create directory", parent, e))?;
            }
            File::create(path).map_err(|e| IngestError::write("create", path, e))?;
        }
        let file = File::open(path).map_err(|source| IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut names = BTreeSet::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| IngestError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
            let name = line.trim();
            if !name.is_empty() {
                names.insert(name.to_string());
            }
        }
        Ok(Self {
            path: path.to_path_buf(),
            names,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Append a file name to the tracker immediately.
    pub fn record(&mut self, name: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| IngestError::write("open", &self.path, e))?;
        writeln!(file, "{name}").map_err(|e| IngestError::write("append", &self.path, e))?;
        self.names.insert(name.to_string());
        Ok(())
    }
}

enum MergeOutcome {
    Empty,
    Merged(MergedExport),
}

/// Merge every new export into its category's Source Table.
///
/// Unknown, empty and failing exports are reported and skipped; only a
/// failure to read the export folder or the tracker aborts the stage.
pub fn merge_exports(layout: &Layout, options: &BronzeOptions) -> Result<BronzeReport> {
    let mut report = BronzeReport::default();
    if !options.export_dir.is_dir() {
        info!(
            export_dir = %options.export_dir.display(),
            "export folder does not exist, nothing to merge"
        );
        report.export_dir_missing = true;
        return Ok(report);
    }
    fs::create_dir_all(&options.temp_dir)
        .map_err(|e| IngestError::write("create directory", &options.temp_dir, e))?;

    let mut processed = ProcessedFiles::load(&options.tracker)?;
    let files = list_export_files(&options.export_dir)?;
    for path in files {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string)
        else {
            continue;
        };
        if processed.contains(&file_name) {
            report.already_processed += 1;
            continue;
        }
        let Some(category) = export_category(&file_name) else {
            debug!(file_name = %file_name, "skipping unrecognized export");
            report.unrecognized.push(file_name);
            continue;
        };

        let span = info_span!("merge", category = %category, file_name = %file_name);
        let _guard = span.enter();
        let temp_path = options.temp_dir.join(&file_name);
        match merge_one(layout, options, &path, &temp_path, category, &file_name) {
            Ok(MergeOutcome::Empty) => {
                info!("skipping empty export");
                report.empty.push(file_name);
            }
            Ok(MergeOutcome::Merged(merged)) => {
                processed.record(&file_name)?;
                info!(
                    rows = merged.rows,
                    target = %merged.target.display(),
                    "export merged"
                );
                report.merged.push(merged);
            }
            Err(error) => {
                warn!(%error, "failed to merge export");
                if temp_path.exists() {
                    let _ = fs::remove_file(&temp_path);
                }
                report.failed.push(FailedExport {
                    file_name,
                    message: error.to_string(),
                });
            }
        }
    }

    report.placeholders = ensure_current_files(layout, options.run_date)?;
    Ok(report)
}

fn merge_one(
    layout: &Layout,
    options: &BronzeOptions,
    source: &Path,
    temp_path: &Path,
    category: Category,
    file_name: &str,
) -> Result<MergeOutcome> {
    let content = fs::read_to_string(source).map_err(|e| IngestError::FileRead {
        path: source.to_path_buf(),
        source: e,
    })?;
    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());
    let parse_error = |error: csv::Error| IngestError::Parse {
        path: source.to_path_buf(),
        message: error.to_string(),
    };
    let headers = reader.headers().map_err(parse_error)?.clone();
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        records.push(record);
    }
    if records.is_empty() {
        return Ok(MergeOutcome::Empty);
    }

    let target = layout.source_table(category);
    let current_dir = layout.bronze_current_dir(category);
    fs::create_dir_all(&current_dir)
        .map_err(|e| IngestError::write("create directory", &current_dir, e))?;
    // A zero-byte placeholder still needs the header.
    let needs_header = fs::metadata(&target).map_or(true, |meta| meta.len() == 0);

    {
        let temp = File::create(temp_path).map_err(|e| IngestError::write("create", temp_path, e))?;
        let mut writer = WriterBuilder::new()
            .delimiter(DELIMITER)
            .terminator(Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(temp);
        let write_error = |error: csv::Error| {
            IngestError::write("write", temp_path, io::Error::other(error.to_string()))
        };
        if needs_header {
            writer.write_record(&headers).map_err(write_error)?;
        }
        for record in &records {
            writer.write_record(record).map_err(write_error)?;
        }
        writer
            .flush()
            .map_err(|e| IngestError::write("flush", temp_path, e))?;
    }

    {
        let mut temp = File::open(temp_path).map_err(|e| IngestError::FileRead {
            path: temp_path.to_path_buf(),
            source: e,
        })?;
        let mut out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&target)
            .map_err(|e| IngestError::write("open", &target, e))?;
        io::copy(&mut temp, &mut out).map_err(|e| IngestError::write("append", &target, e))?;
        out.sync_all()
            .map_err(|e| IngestError::write("sync", &target, e))?;
    }
    fs::remove_file(temp_path).map_err(|e| IngestError::write("remove", temp_path, e))?;

    let backup = backup_source_table(layout, category, options.run_date)?;
    Ok(MergeOutcome::Merged(MergedExport {
        file_name: file_name.to_string(),
        category,
        rows: records.len(),
        target,
        backup,
    }))
}

/// Copy a category's Source Table into its dated backup folder.
pub fn backup_source_table(layout: &Layout, category: Category, date: NaiveDate) -> Result<PathBuf> {
    let source = layout.source_table(category);
    let backup = layout.bronze_backup(category, date);
    if let Some(parent) = backup.parent() {
        fs::create_dir_all(parent).map_err(|e| IngestError::write("create directory", parent, e))?;
    }
    fs::copy(&source, &backup).map_err(|e| IngestError::write("copy", &backup, e))?;
    debug!(backup = %backup.display(), "backup created");
    Ok(backup)
}

/// Make sure every category has a Source Table and a backup for `date`.
///
/// Returns the placeholders created.
pub fn ensure_current_files(layout: &Layout, date: NaiveDate) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();
    for category in Category::ALL {
        let current_dir = layout.bronze_current_dir(category);
        fs::create_dir_all(&current_dir)
            .map_err(|e| IngestError::write("create directory", &current_dir, e))?;
        let target = layout.source_table(category);
        if !target.exists() {
            File::create(&target).map_err(|e| IngestError::write("create", &target, e))?;
            info!(path = %target.display(), "created empty placeholder");
            created.push(target);
        }
        backup_source_table(layout, category, date)?;
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("processed_files.txt");
        let mut tracker = ProcessedFiles::load(&path).unwrap();
        assert!(tracker.is_empty());
        tracker.record("a-Rinse_History.dat").unwrap();
        tracker.record("b-Info_Message_History.dat").unwrap();

        let reloaded = ProcessedFiles::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("a-Rinse_History.dat"));
        assert!(!reloaded.contains("c.dat"));
    }
}
