//! Source Table reading.
//!
//! A Source Table is a `;`-delimited text file with a header row, produced
//! and appended to by the Bronze merge. Every non-blank data line is kept
//! verbatim (trimmed) because that text is what deduplication hashes.

use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// Field delimiter of every Bronze and Silver table.
pub const DELIMITER: u8 = b';';

/// One data line of a Source Table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 1-based line number in the file.
    pub number: usize,
    /// Line content with the terminator and surrounding whitespace removed.
    pub text: String,
    /// Quote-aware split of `text`.
    pub fields: Vec<String>,
}

impl RawLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let fields = split_fields(&text);
        Self {
            number,
            text,
            fields,
        }
    }

    /// Plain `;` split of `text`, ignoring quotes.
    ///
    /// An unterminated quote swallows the rest of the line in the
    /// quote-aware split; this keeps every delimiter significant instead.
    pub fn plain_fields(&self) -> Vec<String> {
        split_plain(&self.text)
    }

    /// An odd number of `"` leaves the last quoted field open.
    pub fn has_open_quote(&self) -> bool {
        self.text.matches('"').count() % 2 == 1
    }
}

/// Parsed Source Table.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub path: PathBuf,
    pub header: Vec<String>,
    pub lines: Vec<RawLine>,
}

/// Outcome of reading a Source Table.
#[derive(Debug)]
pub enum SourceRead {
    /// No file at the path yet.
    Missing,
    /// File exists but holds no non-blank line.
    Empty,
    Table(SourceTable),
}

/// Read a Source Table.
///
/// A missing or blank file is not an error: the upstream merge simply has
/// not produced anything yet.
pub fn read_source_table(path: &Path) -> Result<SourceRead> {
    if !path.exists() {
        return Ok(SourceRead::Missing);
    }
    let bytes = std::fs::read(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(error) => {
            warn!(
                path = %path.display(),
                valid_up_to = error.utf8_error().valid_up_to(),
                "source table is not valid UTF-8, replacing invalid sequences"
            );
            String::from_utf8_lossy(error.as_bytes()).into_owned()
        }
    };
    Ok(parse_source_text(path, &content))
}

/// Parse Source Table text already in memory.
pub fn parse_source_text(path: &Path, content: &str) -> SourceRead {
    let mut numbered = content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());
    let Some((_, header_line)) = numbered.next() else {
        return SourceRead::Empty;
    };
    let header: Vec<String> = split_fields(header_line)
        .iter()
        .map(|name| normalize_header(name))
        .collect();
    let lines: Vec<RawLine> = numbered
        .map(|(number, text)| RawLine::new(number, text))
        .collect();
    debug!(
        path = %path.display(),
        columns = header.len(),
        lines = lines.len(),
        "source table parsed"
    );
    SourceRead::Table(SourceTable {
        path: path.to_path_buf(),
        header,
        lines,
    })
}

/// Split one line on `;`, honouring `"` quoting.
///
/// `"30;31"` stays a single field holding `30;31`.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .buffer_capacity(line.len().max(64))
        .from_reader(line.as_bytes());
    match reader.records().next() {
        Some(Ok(record)) => record.iter().map(str::to_string).collect(),
        Some(Err(error)) => {
            debug!(%error, "falling back to plain split");
            split_plain(line)
        }
        None => Vec::new(),
    }
}

fn split_plain(line: &str) -> Vec<String> {
    line.split(char::from(DELIMITER)).map(str::to_string).collect()
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}
