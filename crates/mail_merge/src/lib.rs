//! Mail Merge
//!
//! This crate reads tabular data sources and fills a DOCX template once per
//! record, writing one document per row.
//!
//! # Features
//!
//! - CSV parsing with a configurable delimiter and BOM handling
//! - XLSX parsing with sheet selection
//! - Normalization of numbers, dates, times, and booleans to display strings
//! - Blank-row skipping
//! - Sequential document generation with progress reporting
//!
//! # Example
//!
//! ```rust
//! use mail_merge::{CsvParser, Record};
//!
//! let csv_data = "Name,City\nAlice,Paris\nBob,Rome";
//! let set = CsvParser::new().parse_string(csv_data).unwrap();
//!
//! assert_eq!(set.len(), 2);
//! assert_eq!(set.records[0].get("City"), Some("Paris"));
//!
//! // Generate one document per record
//! // let count = mail_merge::generate("letter.docx", &set.records, "out").unwrap();
//! ```

mod csv_parser;
mod error;
mod record;
mod xlsx_parser;
pub mod merge_engine;

use std::path::Path;

// Re-export main types
pub use csv_parser::{CsvConfig, CsvParser};
pub use error::{ErrorCategory, MailMergeError, Result};
pub use merge_engine::{generate, GenerateOptions, GenerateReport, MergeEngine, MergeProgress};
pub use record::{Record, RecordSet, Value};
pub use xlsx_parser::{SheetSelector, XlsxConfig, XlsxParser};

/// Supported data file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Xlsx,
}

impl DataFormat {
    /// Pick the format from the file extension, ignoring case
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(DataFormat::Csv),
            Some("xlsx") => Ok(DataFormat::Xlsx),
            _ => Err(MailMergeError::UnsupportedFormat(format!(
                "{} (expected .csv or .xlsx)",
                path.display()
            ))),
        }
    }
}

/// Load records and headers from a `.csv` or `.xlsx` file
pub fn load_records(path: impl AsRef<Path>) -> Result<RecordSet> {
    load_records_with(path, CsvConfig::default(), XlsxConfig::default())
}

/// Load records with explicit parser settings; only the config matching
/// the file's format is used
pub fn load_records_with(
    path: impl AsRef<Path>,
    csv_config: CsvConfig,
    xlsx_config: XlsxConfig,
) -> Result<RecordSet> {
    let path = path.as_ref();

    match DataFormat::from_path(path)? {
        DataFormat::Csv => CsvParser::with_config(csv_config).parse_file(path),
        DataFormat::Xlsx => XlsxParser::with_config(xlsx_config).parse_file(path),
    }
}

/// Read the records of a `.csv` or `.xlsx` file, in file order
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    Ok(load_records(path)?.into_records())
}
