//! Historized writer for the Silver layer.
//!
//! New records are appended to `<silver>/<C>/current/Silver_<C>.dat`; after
//! the append is durable the whole Current Table is copied to the dated
//! History Snapshot. Writing is split into [`HistorizedWriter::prepare`] and
//! [`HistorizedWriter::commit`] so a caller can journal the byte range the
//! append will occupy before touching the table.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use tracing::debug;

use silver_model::{Category, CleanedRecord, Layout, Schema};

use crate::atomic::copy_atomic;
use crate::error::{Result, StoreError};

/// Field delimiter of Silver tables.
pub const OUTPUT_DELIMITER: u8 = b';';

/// Bytes ready to be appended to a Current Table.
#[derive(Debug, Clone)]
pub struct PreparedAppend {
    pub category: Category,
    pub table: PathBuf,
    pub snapshot: PathBuf,
    /// Table length the payload was prepared against.
    pub bytes_before: u64,
    pub rows: usize,
    /// The payload starts with the header row.
    pub writes_header: bool,
    payload: Vec<u8>,
}

impl PreparedAppend {
    pub fn bytes_after(&self) -> u64 {
        self.bytes_before + self.payload.len() as u64
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Result of a committed append.
#[derive(Debug, Clone, Serialize)]
pub struct WriteOutcome {
    pub table: PathBuf,
    pub snapshot: PathBuf,
    pub rows: usize,
    pub bytes_written: u64,
    pub created_table: bool,
}

#[derive(Debug, Clone)]
pub struct HistorizedWriter<'a> {
    layout: &'a Layout,
    run_date: NaiveDate,
}

impl<'a> HistorizedWriter<'a> {
    pub fn new(layout: &'a Layout, run_date: NaiveDate) -> Self {
        Self { layout, run_date }
    }

    /// Encode `records` for appending. Returns `None` when there is nothing to write.
    ///
    /// Fails with [`StoreError::HeaderMismatch`] when an existing Current
    /// Table carries a different header, and with [`StoreError::Record`]
    /// when a record does not match the schema width.
    pub fn prepare(
        &self,
        schema: &Schema,
        records: &[CleanedRecord],
    ) -> Result<Option<PreparedAppend>> {
        if records.is_empty() {
            return Ok(None);
        }
        for record in records {
            schema.check_record(record)?;
        }

        let category = schema.category;
        let table = self.layout.current_table(category);
        let columns = schema.output_columns();
        let bytes_before = match fs::metadata(&table) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(StoreError::io("inspect", &table, e)),
        };

        let writes_header = bytes_before == 0;
        let mut payload = Vec::new();
        if !writes_header {
            let expected = header_line(&table, &columns)?;
            let found = read_first_line(&table)?;
            if found != expected {
                return Err(StoreError::HeaderMismatch {
                    path: table,
                    expected,
                    found,
                });
            }
            if !ends_with_newline(&table)? {
                payload.push(b'\n');
            }
        }
        payload.extend(encode_rows(
            &table,
            writes_header.then_some(columns.as_slice()),
            records,
        )?);

        Ok(Some(PreparedAppend {
            category,
            snapshot: self.layout.history_snapshot(category, self.run_date),
            table,
            bytes_before,
            rows: records.len(),
            writes_header,
            payload,
        }))
    }

    /// Append a prepared payload, then refresh the History Snapshot.
    ///
    /// The snapshot is only taken once the append has been synced.
    pub fn commit(&self, prepared: &PreparedAppend) -> Result<WriteOutcome> {
        if let Some(parent) = prepared.table.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::io("create directory", parent, e))?;
        }
        if let Some(parent) = prepared.snapshot.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::io("create directory", parent, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&prepared.table)
            .map_err(|e| StoreError::io("open", &prepared.table, e))?;
        file.write_all(&prepared.payload)
            .map_err(|e| StoreError::io("append", &prepared.table, e))?;
        file.sync_all()
            .map_err(|e| StoreError::io("sync", &prepared.table, e))?;
        drop(file);

        copy_atomic(&prepared.table, &prepared.snapshot)?;
        debug!(
            table = %prepared.table.display(),
            snapshot = %prepared.snapshot.display(),
            rows = prepared.rows,
            "current table appended and snapshot refreshed"
        );

        Ok(WriteOutcome {
            table: prepared.table.clone(),
            snapshot: prepared.snapshot.clone(),
            rows: prepared.rows,
            bytes_written: prepared.payload.len() as u64,
            created_table: prepared.writes_header,
        })
    }

    /// Prepare and commit in one step.
    pub fn write(&self, schema: &Schema, records: &[CleanedRecord]) -> Result<Option<WriteOutcome>> {
        match self.prepare(schema, records)? {
            Some(prepared) => self.commit(&prepared).map(Some),
            None => Ok(None),
        }
    }
}

fn csv_writer(buffer: &mut Vec<u8>) -> csv::Writer<&mut Vec<u8>> {
    WriterBuilder::new()
        .delimiter(OUTPUT_DELIMITER)
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Necessary)
        .from_writer(buffer)
}

fn encode_rows(
    path: &Path,
    header: Option<&[String]>,
    records: &[CleanedRecord],
) -> Result<Vec<u8>> {
    let encode_error = |error: csv::Error| StoreError::Encode {
        path: path.to_path_buf(),
        message: error.to_string(),
    };
    let mut buffer = Vec::new();
    {
        let mut writer = csv_writer(&mut buffer);
        if let Some(header) = header {
            writer.write_record(header).map_err(encode_error)?;
        }
        for record in records {
            writer
                .write_record(record.to_output_row())
                .map_err(encode_error)?;
        }
        writer
            .flush()
            .map_err(|e| StoreError::io("encode", path, e))?;
    }
    Ok(buffer)
}

/// Header row as it appears in the file, without the terminator.
fn header_line(path: &Path, columns: &[String]) -> Result<String> {
    let bytes = encode_rows(path, Some(columns), &[])?;
    Ok(String::from_utf8_lossy(&bytes)
        .trim_end_matches(['\r', '\n'])
        .to_string())
}

fn read_first_line(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| StoreError::io("open", path, e))?;
    let mut line = String::new();
    BufReader::new(file)
        .read_line(&mut line)
        .map_err(|e| StoreError::io("read", path, e))?;
    Ok(line
        .trim_end_matches(['\r', '\n'])
        .trim_start_matches('\u{feff}')
        .to_string())
}

fn ends_with_newline(path: &Path) -> Result<bool> {
    let mut file = File::open(path).map_err(|e| StoreError::io("open", path, e))?;
    file.seek(SeekFrom::End(-1))
        .map_err(|e| StoreError::io("seek", path, e))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)
        .map_err(|e| StoreError::io("read", path, e))?;
    Ok(last[0] == b'\n')
}
