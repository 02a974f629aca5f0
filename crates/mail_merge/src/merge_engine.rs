//! Mail Merge Execution Engine
//!
//! Loads a DOCX template once, then for every record takes a fresh copy,
//! substitutes its placeholders, and saves it as its own document.

use crate::error::{MailMergeError, Result};
use docx_template::{DocxTemplate, FieldSource};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default prefix for generated file names
pub const DEFAULT_PREFIX: &str = "output_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// File name prefix; the 1-based record index follows it
    pub file_prefix: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            file_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl GenerateOptions {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeProgress {
    pub current_record: usize,
    pub total_records: usize,
    pub percent: f64,
    /// Document written for the current record
    pub output_path: PathBuf,
}

impl MergeProgress {
    pub fn at(current: usize, total: usize, output_path: PathBuf) -> Self {
        let percent = if total > 0 { (current as f64 / total as f64) * 100.0 } else { 0.0 };
        Self {
            current_record: current,
            total_records: total,
            percent,
            output_path,
        }
    }
}

/// Outcome of a completed generation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateReport {
    pub output_dir: PathBuf,
    /// Written documents, in record order
    pub output_paths: Vec<PathBuf>,
    /// Placeholders replaced across all documents
    pub replacements: usize,
}

impl GenerateReport {
    pub fn document_count(&self) -> usize {
        self.output_paths.len()
    }
}

pub struct MergeEngine {
    template: DocxTemplate,
    extension: String,
    options: GenerateOptions,
}

impl MergeEngine {
    /// Load and validate a template.
    ///
    /// Nothing is written until `generate` is called, so a malformed
    /// template never leaves an output directory behind.
    pub fn open(template_path: impl AsRef<Path>, options: GenerateOptions) -> Result<Self> {
        let path = template_path.as_ref();

        if !path.exists() {
            return Err(MailMergeError::FileNotFound(path.display().to_string()));
        }

        let template = DocxTemplate::open(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .unwrap_or("docx")
            .to_string();

        Ok(Self { template, extension, options })
    }

    /// Wrap an already loaded template
    pub fn from_template(template: DocxTemplate, options: GenerateOptions) -> Self {
        Self {
            template,
            extension: "docx".to_string(),
            options,
        }
    }

    pub fn template(&self) -> &DocxTemplate {
        &self.template
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// File name for the record at `index` (0-based)
    pub fn output_name(&self, index: usize) -> String {
        format!("{}{}.{}", self.options.file_prefix, index + 1, self.extension)
    }

    pub fn generate<R: FieldSource>(
        &self,
        records: &[R],
        output_dir: impl AsRef<Path>,
    ) -> Result<GenerateReport> {
        self.generate_with_progress(records, output_dir, |_| {})
    }

    /// Generate one document per record, reporting after each save.
    ///
    /// Stops at the first failure; documents already written stay on disk.
    pub fn generate_with_progress<R, F>(
        &self,
        records: &[R],
        output_dir: impl AsRef<Path>,
        mut on_progress: F,
    ) -> Result<GenerateReport>
    where
        R: FieldSource,
        F: FnMut(MergeProgress),
    {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;

        let total = records.len();
        let mut report = GenerateReport {
            output_dir: output_dir.to_path_buf(),
            ..Default::default()
        };

        for (i, record) in records.iter().enumerate() {
            let mut document = self.template.clone();
            report.replacements += document.substitute(record);

            let path = output_dir.join(self.output_name(i));
            document.save(&path)?;
            tracing::info!("Saved: {}", path.display());

            on_progress(MergeProgress::at(i + 1, total, path.clone()));
            report.output_paths.push(path);
        }

        tracing::info!(
            "Generated {} documents in {} ({} replacements)",
            report.document_count(),
            output_dir.display(),
            report.replacements
        );
        Ok(report)
    }
}

/// Generate `output_<n>.docx` for every record and return how many were written
pub fn generate<R: FieldSource>(
    template_path: impl AsRef<Path>,
    records: &[R],
    output_dir: impl AsRef<Path>,
) -> Result<usize> {
    let engine = MergeEngine::open(template_path, GenerateOptions::default())?;
    Ok(engine.generate(records, output_dir)?.document_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn template_bytes(body: &str) -> Vec<u8> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>"#,
            body
        );
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            zip.start_file("[Content_Types].xml", SimpleFileOptions::default()).unwrap();
            zip.write_all(b"<Types/>").unwrap();
            zip.start_file("word/document.xml", SimpleFileOptions::default()).unwrap();
            zip.write_all(document.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        cursor.into_inner()
    }

    fn engine(body: &str, options: GenerateOptions) -> MergeEngine {
        let template = DocxTemplate::from_bytes(&template_bytes(body)).unwrap();
        MergeEngine::from_template(template, options)
    }

    fn records(names: &[&str]) -> Vec<Record> {
        names.iter().map(|n| [("Name", *n)].into_iter().collect()).collect()
    }

    #[test]
    fn test_output_names() {
        let e = engine("x", GenerateOptions::default());
        assert_eq!(e.output_name(0), "output_1.docx");
        assert_eq!(e.output_name(9), "output_10.docx");

        let e = engine("x", GenerateOptions::default().with_prefix("letter-"));
        assert_eq!(e.output_name(2), "letter-3.docx");
    }

    #[test]
    fn test_generate_report() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("letters");

        let report = engine("Hi {{Name}} {{Name}}", GenerateOptions::default())
            .generate(&records(&["Ann", "Ben"]), &out)
            .unwrap();

        assert_eq!(report.document_count(), 2);
        assert_eq!(report.replacements, 4);
        assert_eq!(report.output_paths[1], out.join("output_2.docx"));
        assert!(out.join("output_1.docx").is_file());
    }

    #[test]
    fn test_progress_updates() {
        let dir = tempfile::tempdir().unwrap();
        let mut updates = Vec::new();

        engine("{{Name}}", GenerateOptions::default())
            .generate_with_progress(&records(&["a", "b", "c"]), dir.path(), |p| updates.push(p))
            .unwrap();

        assert_eq!(updates.len(), 3);
        assert_eq!(updates[2].current_record, 3);
        assert!((updates[2].percent - 100.0).abs() < f64::EPSILON);
        assert!(updates[0].output_path.ends_with("output_1.docx"));
    }

    #[test]
    fn test_no_records_still_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty");

        let report = engine("{{Name}}", GenerateOptions::default())
            .generate(&records(&[]), &out)
            .unwrap();

        assert_eq!(report.document_count(), 0);
        assert!(out.is_dir());
    }

    #[test]
    fn test_template_not_found() {
        let result = MergeEngine::open("/nonexistent/letter.docx", GenerateOptions::default());
        assert!(matches!(result, Err(MailMergeError::FileNotFound(_))));
    }

    #[test]
    fn test_report_serialization() {
        let report = GenerateReport { output_dir: PathBuf::from("out"), output_paths: vec![], replacements: 0 };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"replacements\":0"));
    }
}
