//! DOCX Templates
//!
//! This crate loads Word (.docx) documents, replaces `{{Field}}`
//! placeholders in their text, and writes the result back as a valid
//! package.
//!
//! # Features
//!
//! - Lossless ZIP package handling; untouched parts keep their exact bytes
//! - Paragraph, run, and table model over the raw WordprocessingML
//! - Substitution in body paragraphs, table cells (including nested
//!   tables), headers, and footers
//! - Deterministic output for identical input
//!
//! # Example
//!
//! ```rust,no_run
//! use docx_template::DocxTemplate;
//! use std::collections::HashMap;
//!
//! let mut template = DocxTemplate::open("letter.docx").unwrap();
//! let mut fields = HashMap::new();
//! fields.insert("Name".to_string(), "Alice".to_string());
//!
//! template.substitute(&fields);
//! template.save("letter_alice.docx").unwrap();
//! ```

mod document;
mod error;
mod package;
mod substitute;
mod template;

#[cfg(test)]
mod test_support;

pub use document::{Body, DocumentPart, Paragraph, Run, Table, TableCell, TableRow, TextNode};
pub use error::{TemplateError, TemplateResult};
pub use package::{DocxPackage, PackageEntry, CONTENT_TYPES_PART, DEFAULT_DOCUMENT_PART, ROOT_RELS_PART};
pub use substitute::{find_placeholders, substitute_text, FieldSource};
pub use template::DocxTemplate;
