//! Temp-file-and-rename writes.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("silver"));
    name.push(".tmp");
    path.with_file_name(name)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io("create directory", parent, e))?;
    }
    Ok(())
}

fn replace(temp_path: PathBuf, path: &Path) -> Result<()> {
    fs::rename(&temp_path, path).map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        StoreError::AtomicWriteFailed {
            temp_path,
            target_path: path.to_path_buf(),
            source,
        }
    })
}

/// Replace `path` with `bytes`; readers see either the old or the new file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent(path)?;
    let temp_path = temp_path_for(path);

    let mut file = File::create(&temp_path).map_err(|e| StoreError::io("create", &temp_path, e))?;
    file.write_all(bytes)
        .map_err(|e| StoreError::io("write", &temp_path, e))?;
    file.sync_all()
        .map_err(|e| StoreError::io("sync", &temp_path, e))?;
    drop(file);

    replace(temp_path, path)
}

/// Copy `source` over `target` atomically. Returns the bytes copied.
pub fn copy_atomic(source: &Path, target: &Path) -> Result<u64> {
    ensure_parent(target)?;
    let temp_path = temp_path_for(target);

    let mut input = File::open(source).map_err(|e| StoreError::io("open", source, e))?;
    let mut output =
        File::create(&temp_path).map_err(|e| StoreError::io("create", &temp_path, e))?;
    let copied =
        io::copy(&mut input, &mut output).map_err(|e| StoreError::io("copy", &temp_path, e))?;
    output
        .sync_all()
        .map_err(|e| StoreError::io("sync", &temp_path, e))?;
    drop(output);

    replace(temp_path, target)?;
    Ok(copied)
}
