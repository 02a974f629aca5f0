//! Error types for DOCX template operations

use thiserror::Error;

/// Errors that can occur while loading, substituting, or saving a template
#[derive(Debug, Error)]
pub enum TemplateError {
    /// IO error (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing or writing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Invalid DOCX structure
    #[error("Invalid DOCX structure: {0}")]
    InvalidStructure(String),
}

impl TemplateError {
    /// Take out the underlying IO error, or give the error back unchanged
    pub fn into_io_error(self) -> Result<std::io::Error, Self> {
        match self {
            TemplateError::Io(e) | TemplateError::Zip(zip::result::ZipError::Io(e)) => Ok(e),
            other => Err(other),
        }
    }
}

impl From<quick_xml::Error> for TemplateError {
    fn from(err: quick_xml::Error) -> Self {
        TemplateError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for TemplateError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        TemplateError::Xml(format!("Attribute error: {}", err))
    }
}

/// Result type for template operations
pub type TemplateResult<T> = std::result::Result<T, TemplateError>;
