//! Export file discovery and category matching.

use std::path::{Path, PathBuf};

use silver_model::Category;

use crate::error::{IngestError, Result};

/// Lists all `.dat` files in a directory.
///
/// Returns files sorted by filename.
pub fn list_export_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let is_dat = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("dat"));

        if is_dat {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// Matches an export file name to its category.
///
/// The category is encoded in the last `-`-separated segment, e.g.
/// `CM-0042-20240315-Rinse_History.dat`.
pub fn export_category(file_name: &str) -> Option<Category> {
    let segment = file_name.rsplit('-').next()?;
    let suffix = segment
        .strip_suffix(".dat")
        .or_else(|| segment.strip_suffix(".DAT"))
        .unwrap_or(segment);
    Category::from_export_suffix(suffix)
}
