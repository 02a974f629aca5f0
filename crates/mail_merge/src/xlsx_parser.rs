//! XLSX parser for mail merge data sources

use std::io::{Read, Seek};
use std::path::Path;

use calamine::{open_workbook, Data, ExcelDateTime, Range, Reader, Xlsx};
use chrono::NaiveTime;

use crate::error::{MailMergeError, Result};
use crate::record::{round_to_second, Record, RecordSet, Value};

/// Selector for which sheet to read from an Excel workbook
#[derive(Debug, Clone, Default)]
pub enum SheetSelector {
    /// Select sheet by name
    ByName(String),
    /// Select sheet by index (0-based)
    ByIndex(usize),
    /// Select the first sheet
    #[default]
    First,
}

/// XLSX parser configuration
#[derive(Debug, Clone)]
pub struct XlsxConfig {
    /// Sheet name or index to read from
    pub sheet: SheetSelector,
    /// Skip rows with no cells at all
    pub skip_empty_rows: bool,
}

impl Default for XlsxConfig {
    fn default() -> Self {
        Self {
            sheet: SheetSelector::First,
            skip_empty_rows: true,
        }
    }
}

impl XlsxConfig {
    /// Create a new XLSX config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sheet to read by name
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet = SheetSelector::ByName(name.into());
        self
    }

    /// Set the sheet to read by index (0-based)
    pub fn with_sheet_index(mut self, index: usize) -> Self {
        self.sheet = SheetSelector::ByIndex(index);
        self
    }

    /// Set whether to skip empty rows
    pub fn with_skip_empty_rows(mut self, skip: bool) -> Self {
        self.skip_empty_rows = skip;
        self
    }
}

/// XLSX parser producing records keyed by the first row
#[derive(Debug, Clone, Default)]
pub struct XlsxParser {
    config: XlsxConfig,
}

impl XlsxParser {
    /// Create a new XLSX parser with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new XLSX parser with custom configuration
    pub fn with_config(config: XlsxConfig) -> Self {
        Self { config }
    }

    /// Parse an XLSX file
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<RecordSet> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(MailMergeError::FileNotFound(path.display().to_string()));
        }

        let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| {
            MailMergeError::XlsxParse(format!("Failed to open workbook: {}", e))
        })?;

        self.parse_workbook(&mut workbook)
    }

    /// Parse XLSX from bytes
    pub fn parse_bytes(&self, data: &[u8]) -> Result<RecordSet> {
        let cursor = std::io::Cursor::new(data);
        let mut workbook: Xlsx<_> = Xlsx::new(cursor).map_err(|e| {
            MailMergeError::XlsxParse(format!("Failed to read workbook from bytes: {}", e))
        })?;

        self.parse_workbook(&mut workbook)
    }

    /// Get the sheet name based on the selector
    fn sheet_name<RS: Read + Seek>(&self, workbook: &Xlsx<RS>) -> Result<String> {
        let sheet_names = workbook.sheet_names();

        if sheet_names.is_empty() {
            return Err(MailMergeError::XlsxParse("Workbook has no sheets".to_string()));
        }

        match &self.config.sheet {
            SheetSelector::ByName(name) => {
                if sheet_names.contains(name) {
                    Ok(name.clone())
                } else {
                    Err(MailMergeError::XlsxParse(format!(
                        "Sheet '{}' not found. Available sheets: {:?}",
                        name, sheet_names
                    )))
                }
            }
            SheetSelector::ByIndex(index) => {
                sheet_names.get(*index).cloned().ok_or_else(|| {
                    MailMergeError::XlsxParse(format!(
                        "Sheet index {} out of range. Workbook has {} sheets",
                        index,
                        sheet_names.len()
                    ))
                })
            }
            SheetSelector::First => Ok(sheet_names[0].clone()),
        }
    }

    fn parse_workbook<RS: Read + Seek>(&self, workbook: &mut Xlsx<RS>) -> Result<RecordSet> {
        let sheet_name = self.sheet_name(workbook)?;
        tracing::debug!("Reading sheet '{}'", sheet_name);

        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            MailMergeError::XlsxParse(format!("Failed to read sheet '{}': {}", sheet_name, e))
        })?;

        Ok(self.parse_range(&range))
    }

    /// Turn a sheet into records.
    ///
    /// Coordinates are absolute: row 1 of the sheet holds the headers even
    /// when the used range starts further down or to the right.
    fn parse_range(&self, range: &Range<Data>) -> RecordSet {
        let Some((end_row, end_col)) = range.end() else {
            return RecordSet::default();
        };

        let headers: Vec<String> = (0..=end_col)
            .map(|col| {
                range
                    .get_value((0, col))
                    .map(|cell| cell_to_value(cell).to_string_value().trim().to_string())
                    .unwrap_or_default()
            })
            .collect();

        let mut records: Vec<Record> = Vec::new();
        for row in 1..=end_row {
            let cells: Vec<Option<&Data>> = (0..=end_col)
                .map(|col| range.get_value((row, col)))
                .collect();

            if self.config.skip_empty_rows && cells.iter().all(|c| is_absent(*c)) {
                tracing::debug!("Skipping empty sheet row {}", row + 1);
                continue;
            }

            let values = cells
                .into_iter()
                .map(|cell| cell.map(|c| cell_to_value(c).to_string_value()).unwrap_or_default());
            records.push(RecordSet::zip_row(&headers, values));
        }

        RecordSet { headers, records }
    }
}

fn is_absent(cell: Option<&Data>) -> bool {
    matches!(cell, None | Some(Data::Empty))
}

/// Convert an Excel cell to our Value type
pub(crate) fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::Text(s.clone()),
        Data::Int(n) => Value::Number(*n as f64),
        Data::Float(n) => Value::Number(*n),
        Data::Bool(b) => Value::Boolean(*b),
        Data::DateTime(dt) => excel_datetime_to_value(dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(e) => Value::Text(e.to_string()),
    }
}

/// Convert an Excel date cell to a value.
///
/// Serials below 1 carry only a time of day. Everything else goes through
/// calamine, which applies the workbook's 1900 or 1904 epoch.
fn excel_datetime_to_value(dt: &ExcelDateTime) -> Value {
    let serial = dt.as_f64();
    if !serial.is_finite() || serial < 0.0 {
        return Value::Number(serial);
    }

    if serial < 1.0 {
        let seconds = (serial * 86_400.0).round() as u32 % 86_400;
        return NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
            .map(Value::Time)
            .unwrap_or(Value::Number(serial));
    }

    match dt.as_datetime() {
        Some(datetime) => Value::DateTime(round_to_second(datetime)),
        None => Value::Number(serial),
    }
}
