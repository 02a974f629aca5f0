//! Records, record sets, and cell values

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use docx_template::FieldSource;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single row of data: field name to normalized string value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of a field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Set a field, replacing any earlier value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over (field, value) pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.fields
    }
}

impl FieldSource for Record {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name)
    }
}

impl From<HashMap<String, String>> for Record {
    fn from(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Records read from a data file, along with its header row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    /// Field names in column order, trimmed
    pub headers: Vec<String>,
    /// Non-blank rows in file order
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check if a header exists
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// The first `limit` records
    pub fn preview(&self, limit: usize) -> &[Record] {
        &self.records[..limit.min(self.records.len())]
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Build a record from one row of raw cells.
    ///
    /// Short rows are padded with empty strings and cells past the last
    /// header are dropped. With duplicate headers the later column wins.
    pub(crate) fn zip_row<I>(headers: &[String], cells: I) -> Record
    where
        I: IntoIterator<Item = String>,
    {
        let mut cells = cells.into_iter();
        let mut record = Record::new();
        for header in headers {
            record.insert(header.clone(), cells.next().unwrap_or_default());
        }
        record
    }
}

/// A cell value before it is rendered into a record
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text/string value
    Text(String),
    /// Numeric value
    Number(f64),
    /// Calendar date, possibly with a time of day
    DateTime(NaiveDateTime),
    /// Time of day without a date
    Time(NaiveTime),
    /// Boolean value
    Boolean(bool),
    /// Null/missing value
    Null,
}

impl Value {
    /// Render the value the way it appears in a generated document
    pub fn to_string_value(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => format_number(*n),
            Value::DateTime(dt) => {
                if dt.time() == NaiveTime::MIN {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            Value::Time(t) => t.format("%H:%M:%S").to_string(),
            Value::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Value::Null => String::new(),
        }
    }
}

/// Format a number without unnecessary decimal places. NaN renders empty.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        String::new()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Drop sub-second noise left over from serial date arithmetic
pub(crate) fn round_to_second(dt: NaiveDateTime) -> NaiveDateTime {
    if dt.nanosecond() >= 500_000_000 {
        dt.with_nanosecond(0)
            .and_then(|d| d.checked_add_signed(chrono::Duration::seconds(1)))
            .unwrap_or(dt)
    } else {
        dt.with_nanosecond(0).unwrap_or(dt)
    }
}
