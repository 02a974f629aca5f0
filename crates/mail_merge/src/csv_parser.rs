//! CSV parser for mail merge data sources

use std::io::Read;
use std::path::Path;

use crate::error::{MailMergeError, Result};
use crate::record::{Record, RecordSet};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV parser configuration
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Field delimiter byte
    pub delimiter: u8,
    /// Skip rows whose cells are all empty or whitespace
    pub skip_blank_rows: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            skip_blank_rows: true,
        }
    }
}

impl CsvConfig {
    /// Create a new CSV config with comma delimiter
    pub fn comma() -> Self {
        Self::default()
    }

    /// Create a new CSV config with semicolon delimiter
    pub fn semicolon() -> Self {
        Self {
            delimiter: b';',
            ..Default::default()
        }
    }

    /// Create a new CSV config with tab delimiter
    pub fn tab() -> Self {
        Self {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    /// Set the delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether blank rows are skipped
    pub fn with_skip_blank_rows(mut self, skip: bool) -> Self {
        self.skip_blank_rows = skip;
        self
    }
}

/// CSV parser producing records keyed by the header row
#[derive(Debug, Clone, Default)]
pub struct CsvParser {
    config: CsvConfig,
}

impl CsvParser {
    /// Create a new CSV parser with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new CSV parser with custom configuration
    pub fn with_config(config: CsvConfig) -> Self {
        Self { config }
    }

    /// Parse a CSV file
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<RecordSet> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(MailMergeError::FileNotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        let records = self.parse_bytes(&bytes)?;
        tracing::debug!(
            "Read {} records from {}",
            records.len(),
            path.display()
        );
        Ok(records)
    }

    /// Parse CSV from a string
    pub fn parse_string(&self, data: &str) -> Result<RecordSet> {
        self.parse_bytes(data.as_bytes())
    }

    /// Parse CSV from raw bytes, stripping a leading UTF-8 BOM
    pub fn parse_bytes(&self, data: &[u8]) -> Result<RecordSet> {
        self.parse_reader(data.strip_prefix(UTF8_BOM).unwrap_or(data))
    }

    fn parse_reader<R: Read>(&self, reader: R) -> Result<RecordSet> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = csv_reader.records();

        let headers: Vec<String> = match rows.next() {
            Some(header) => header?.iter().map(|h| h.trim().to_string()).collect(),
            None => return Ok(RecordSet::default()),
        };

        let mut records: Vec<Record> = Vec::new();
        let mut skipped = 0;
        for (line, row) in rows.enumerate() {
            let row = row?;
            if self.config.skip_blank_rows && is_blank(&row) {
                tracing::debug!("Skipping blank CSV row {}", line + 2);
                skipped += 1;
                continue;
            }
            records.push(RecordSet::zip_row(&headers, row.iter().map(str::to_string)));
        }

        if skipped > 0 {
            tracing::debug!("Skipped {} blank CSV rows", skipped);
        }

        Ok(RecordSet { headers, records })
    }
}

fn is_blank(row: &csv::StringRecord) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}
