//! DOCX template: a package plus its parsed story parts

use crate::document::{DocumentPart, Paragraph, Table};
use crate::error::TemplateResult;
use crate::package::DocxPackage;
use crate::substitute::{collect_placeholders, substitute_body, FieldSource};
use std::collections::BTreeSet;
use std::path::Path;

/// A loaded DOCX template.
///
/// Cloning a template yields an independent copy; substitution on the
/// clone never touches the original.
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    package: DocxPackage,
    /// Main document first, then headers and footers in archive order
    parts: Vec<(String, DocumentPart)>,
}

impl DocxTemplate {
    /// Load a template from a file on disk
    pub fn open(path: impl AsRef<Path>) -> TemplateResult<Self> {
        let path = path.as_ref();
        let package = DocxPackage::read_from_file(path)?;
        let template = Self::from_package(package)?;
        tracing::debug!(
            "Loaded template {} ({} story parts)",
            path.display(),
            template.parts.len()
        );
        Ok(template)
    }

    /// Load a template from DOCX bytes
    pub fn from_bytes(bytes: &[u8]) -> TemplateResult<Self> {
        Self::from_package(DocxPackage::read_from_bytes(bytes)?)
    }

    /// Parse the story parts of an already-read package
    pub fn from_package(package: DocxPackage) -> TemplateResult<Self> {
        let main = package.main_document_part()?;
        let mut names = vec![main];
        names.extend(package.header_footer_parts());

        let mut parts = Vec::with_capacity(names.len());
        for name in names {
            let bytes = package.part(&name).unwrap_or_default();
            let part = DocumentPart::parse(bytes)?;
            parts.push((name, part));
        }

        Ok(Self { package, parts })
    }

    /// The main document part
    pub fn document(&self) -> &DocumentPart {
        &self.parts[0].1
    }

    /// Body-level paragraphs of the main document
    pub fn paragraphs(&self) -> &[Paragraph] {
        self.document().body().paragraphs()
    }

    /// Body-level tables of the main document
    pub fn tables(&self) -> &[Table] {
        self.document().body().tables()
    }

    /// All story parts with their package names
    pub fn parts(&self) -> impl Iterator<Item = (&str, &DocumentPart)> {
        self.parts.iter().map(|(name, part)| (name.as_str(), part))
    }

    /// Distinct placeholder names found anywhere in the template
    pub fn placeholders(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for (_, part) in &self.parts {
            collect_placeholders(part.body(), &mut names);
        }
        names
    }

    /// Replace every `{{key}}` known to `fields` in every story part.
    ///
    /// Returns the number of replacements made.
    pub fn substitute<F: FieldSource + ?Sized>(&mut self, fields: &F) -> usize {
        self.parts
            .iter_mut()
            .map(|(_, part)| substitute_body(part.body_mut(), fields))
            .sum()
    }

    /// Build the output package with all modified parts re-serialized
    pub fn to_package(&self) -> TemplateResult<DocxPackage> {
        let mut package = self.package.clone();
        for (name, part) in &self.parts {
            if part.is_modified() {
                package.set_part(name, part.to_xml()?);
            }
        }
        Ok(package)
    }

    /// Save the template to a file
    pub fn save(&self, path: impl AsRef<Path>) -> TemplateResult<()> {
        self.to_package()?.write_to_file(path)
    }

    /// Serialize the template to DOCX bytes
    pub fn to_bytes(&self) -> TemplateResult<Vec<u8>> {
        self.to_package()?.to_bytes()
    }
}
