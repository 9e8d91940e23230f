//! Dedup ledger: the set of fingerprints already carried into Silver.
//!
//! One lowercase hex fingerprint per line. The file only ever grows; an
//! entry is appended after the rows it stands for are durable in the
//! Current Table.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::fingerprint::Fingerprint;

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    entries: HashSet<Fingerprint>,
}

impl Ledger {
    /// Load the ledger at `path`. A missing file is an empty ledger.
    ///
    /// Lines that are not fingerprints are skipped with a warning.
    pub fn load(path: &Path) -> Result<Self> {
        let mut entries = HashSet::new();
        if path.exists() {
            let content =
                fs::read_to_string(path).map_err(|e| StoreError::io("read", path, e))?;
            let mut skipped = 0usize;
            for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
                match line.parse::<Fingerprint>() {
                    Ok(fingerprint) => {
                        entries.insert(fingerprint);
                    }
                    Err(_) => skipped += 1,
                }
            }
            if skipped > 0 {
                warn!(path = %path.display(), skipped, "ignored malformed ledger entries");
            }
        }
        debug!(path = %path.display(), entries = entries.len(), "ledger loaded");
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.contains(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Durably append fingerprints not yet present. Returns how many were new.
    pub fn append(&mut self, fingerprints: &[Fingerprint]) -> Result<usize> {
        let mut fresh = Vec::new();
        let mut batch = HashSet::new();
        for fingerprint in fingerprints {
            if !self.entries.contains(fingerprint) && batch.insert(*fingerprint) {
                fresh.push(*fingerprint);
            }
        }
        if fresh.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::io("create directory", parent, e))?;
        }
        let mut text = String::with_capacity(fresh.len() * 33);
        for fingerprint in &fresh {
            text.push_str(&fingerprint.to_hex());
            text.push('\n');
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io("open", &self.path, e))?;
        file.write_all(text.as_bytes())
            .map_err(|e| StoreError::io("append", &self.path, e))?;
        file.sync_all()
            .map_err(|e| StoreError::io("sync", &self.path, e))?;

        self.entries.extend(fresh.iter().copied());
        Ok(fresh.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::load(&dir.path().join("cleaned_lines.txt")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn append_persists_and_skips_known() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("current").join("cleaned_lines.txt");
        let a = Fingerprint::of_line("a");
        let b = Fingerprint::of_line("b");

        let mut ledger = Ledger::load(&path).unwrap();
        assert_eq!(ledger.append(&[a, b, a]).unwrap(), 2);
        assert_eq!(ledger.append(&[b]).unwrap(), 0);

        let reloaded = Ledger::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains(&a));
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleaned_lines.txt");
        let good = Fingerprint::of_line("x");
        fs::write(&path, format!("not-hex\n\n{good}\n0123\n")).unwrap();
        let ledger = Ledger::load(&path).unwrap();
        assert_eq!(ledger.len(), 1);
        assert!(ledger.contains(&good));
    }
}
