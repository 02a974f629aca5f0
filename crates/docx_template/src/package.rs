//! DOCX package (ZIP container) reading and writing
//!
//! A DOCX file is a ZIP archive of XML parts. The package keeps every entry
//! as raw bytes in archive order so that parts nobody touched are written
//! back exactly as they were read.

use crate::error::{TemplateError, TemplateResult};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::read::ZipArchive;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Content types part, required in every OOXML package
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
/// Package-level relationships part
pub const ROOT_RELS_PART: &str = "_rels/.rels";
/// Conventional location of the main document part
pub const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";

const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// A single entry of the ZIP archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    /// Entry name inside the archive (e.g. `word/document.xml`)
    pub name: String,
    /// Raw entry data; empty for directories
    pub data: Vec<u8>,
    /// Whether the entry is a directory
    pub is_dir: bool,
}

/// An in-memory DOCX package
#[derive(Debug, Clone, Default)]
pub struct DocxPackage {
    entries: Vec<PackageEntry>,
}

impl DocxPackage {
    /// Read a package from a file on disk
    pub fn read_from_file(path: impl AsRef<Path>) -> TemplateResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::read_from_reader(BufReader::new(file))
    }

    /// Read a package from an in-memory byte slice
    pub fn read_from_bytes(bytes: &[u8]) -> TemplateResult<Self> {
        Self::read_from_reader(Cursor::new(bytes))
    }

    /// Read a package from any seekable reader
    pub fn read_from_reader<R: Read + Seek>(reader: R) -> TemplateResult<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();
            let is_dir = file.is_dir();
            let mut data = Vec::new();
            if !is_dir {
                file.read_to_end(&mut data)?;
            }
            entries.push(PackageEntry { name, data, is_dir });
        }

        let package = Self { entries };
        if !package.contains(CONTENT_TYPES_PART) {
            return Err(TemplateError::MissingPart(CONTENT_TYPES_PART.to_string()));
        }
        Ok(package)
    }

    /// Check if a part exists in the package
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Get the raw bytes of a part
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name && !e.is_dir)
            .map(|e| e.data.as_slice())
    }

    /// Replace the bytes of an existing part, or append a new one
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(PackageEntry {
                name: name.to_string(),
                data,
                is_dir: false,
            }),
        }
    }

    /// Names of all entries, in archive order
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Resolve the main document part through the root relationships.
    ///
    /// Falls back to `word/document.xml` when `_rels/.rels` is absent or
    /// carries no officeDocument relationship.
    pub fn main_document_part(&self) -> TemplateResult<String> {
        let target = match self.part(ROOT_RELS_PART) {
            Some(rels) => find_office_document_target(rels)?,
            None => None,
        };
        let name = target
            .map(|t| t.trim_start_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_DOCUMENT_PART.to_string());

        if self.part(&name).is_none() {
            return Err(TemplateError::MissingPart(name));
        }
        Ok(name)
    }

    /// Header and footer parts that sit next to the main document
    pub fn header_footer_parts(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir && is_header_or_footer(&e.name))
            .map(|e| e.name.clone())
            .collect()
    }

    /// Write the package to a file, replacing any existing file
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> TemplateResult<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the package to an in-memory byte vector
    pub fn to_bytes(&self) -> TemplateResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to_writer(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write the package to a writer.
    ///
    /// Entries keep their archive order and carry a fixed timestamp, so the
    /// same package always serializes to the same bytes.
    pub fn write_to_writer<W: Write + Seek>(&self, writer: W) -> TemplateResult<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        for entry in &self.entries {
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
            } else {
                zip.start_file(entry.name.as_str(), options)?;
                zip.write_all(&entry.data)?;
            }
        }

        zip.finish()?;
        Ok(())
    }
}

fn is_header_or_footer(name: &str) -> bool {
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    !file.contains('/')
        && file.ends_with(".xml")
        && (file.starts_with("header") || file.starts_with("footer"))
}

/// Scan `_rels/.rels` for the officeDocument relationship target
fn find_office_document_target(rels: &[u8]) -> TemplateResult<Option<String>> {
    let mut reader = Reader::from_reader(rels);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = e.name();
                let local = name.local_name();
                if local.as_ref() == b"Relationship" {
                    let mut rel_type = None;
                    let mut target = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = String::from_utf8_lossy(&attr.value).to_string();
                        match attr.key.as_ref() {
                            b"Type" => rel_type = Some(value),
                            b"Target" => target = Some(value),
                            _ => {}
                        }
                    }
                    if rel_type.as_deref() == Some(OFFICE_DOCUMENT_REL) {
                        return Ok(target);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(None)
}
