//! Error types for mail merge operations

use docx_template::TemplateError;
use thiserror::Error;

/// Errors that can occur during mail merge operations
#[derive(Debug, Error)]
pub enum MailMergeError {
    /// Data file extension is neither `.csv` nor `.xlsx`
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// IO error reading/writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Error parsing CSV data
    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    /// Error parsing XLSX data
    #[error("XLSX parse error: {0}")]
    XlsxParse(String),

    /// Template could not be read as a Word document
    #[error("Malformed template: {0}")]
    MalformedTemplate(TemplateError),
}

/// Coarse classification of a failure, as reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UnsupportedFormat,
    IoFailure,
    MalformedTemplate,
    MalformedData,
}

impl MailMergeError {
    /// Which category this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            MailMergeError::UnsupportedFormat(_) => ErrorCategory::UnsupportedFormat,
            MailMergeError::Io(_) | MailMergeError::FileNotFound(_) => ErrorCategory::IoFailure,
            MailMergeError::CsvParse(e) if e.is_io_error() => ErrorCategory::IoFailure,
            MailMergeError::CsvParse(_) | MailMergeError::XlsxParse(_) => ErrorCategory::MalformedData,
            MailMergeError::MalformedTemplate(_) => ErrorCategory::MalformedTemplate,
        }
    }
}

impl From<TemplateError> for MailMergeError {
    fn from(err: TemplateError) -> Self {
        match err.into_io_error() {
            Ok(e) => MailMergeError::Io(e),
            Err(other) => MailMergeError::MalformedTemplate(other),
        }
    }
}

/// Result type for mail merge operations
pub type Result<T> = std::result::Result<T, MailMergeError>;
