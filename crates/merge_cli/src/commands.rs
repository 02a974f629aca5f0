//! Command handlers: thin calls into the mail merge crates

use crate::recent::{RecentEntry, RecentKind, RecentStore};
use anyhow::{bail, ensure, Context, Result};
use docx_template::DocxTemplate;
use mail_merge::{CsvConfig, GenerateOptions, MergeEngine, RecordSet, XlsxConfig};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

// =============================================================================
// Data loading
// =============================================================================

/// How to read a data file
#[derive(Debug, Clone)]
pub struct DataOptions {
    pub sheet: Option<String>,
    pub delimiter: char,
}

impl Default for DataOptions {
    fn default() -> Self {
        Self { sheet: None, delimiter: ',' }
    }
}

/// Read a CSV or XLSX file with the given options
pub fn load_data(path: &Path, options: &DataOptions) -> Result<RecordSet> {
    ensure!(
        options.delimiter.is_ascii(),
        "Delimiter must be a single ASCII character, got '{}'",
        options.delimiter
    );

    let csv_config = CsvConfig::default().with_delimiter(options.delimiter as u8);
    let xlsx_config = match options.sheet {
        Some(ref sheet) => XlsxConfig::new().with_sheet_name(sheet.as_str()),
        None => XlsxConfig::new(),
    };
    Ok(mail_merge::load_records_with(path, csv_config, xlsx_config)?)
}

// =============================================================================
// generate
// =============================================================================

pub fn generate(template: &Path, data: &Path, output: &Path, options: &DataOptions, prefix: &str) -> Result<()> {
    // Data first, so an unsupported file fails before anything is written
    let set = load_data(data, options)?;

    let engine = MergeEngine::open(template, GenerateOptions::default().with_prefix(prefix))?;
    let report = engine.generate(&set.records, output)?;

    println!("{} documents created in '{}'", report.document_count(), output.display());
    Ok(())
}

// =============================================================================
// records
// =============================================================================

pub fn records(data: &Path, limit: Option<usize>, options: &DataOptions) -> Result<()> {
    let set = load_data(data, options)?;
    let shown = match limit {
        Some(n) => set.preview(n),
        None => &set.records[..],
    };

    println!("{}", serde_json::to_string_pretty(shown)?);
    Ok(())
}

// =============================================================================
// fields
// =============================================================================

/// A placeholder and whether some data column provides it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStatus {
    pub name: String,
    pub matched: bool,
}

/// Check placeholders against headers; exact, case-sensitive match
pub fn field_report(placeholders: &BTreeSet<String>, headers: &[String]) -> Vec<FieldStatus> {
    placeholders
        .iter()
        .map(|name| FieldStatus {
            name: name.clone(),
            matched: headers.iter().any(|h| h == name),
        })
        .collect()
}

pub fn fields(template: &Path, data: Option<&Path>, options: &DataOptions) -> Result<()> {
    let doc = DocxTemplate::open(template)
        .with_context(|| format!("Failed to open template '{}'", template.display()))?;
    let placeholders = doc.placeholders();

    if placeholders.is_empty() {
        println!("No placeholders found in '{}'", template.display());
        return Ok(());
    }

    match data {
        Some(data) => {
            let set = load_data(data, options)?;
            for field in field_report(&placeholders, &set.headers) {
                if field.matched {
                    println!("{{{{{}}}}}", field.name);
                } else {
                    println!("{{{{{}}}}}  (no matching column)", field.name);
                }
            }
        }
        None => {
            for name in &placeholders {
                println!("{{{{{}}}}}", name);
            }
        }
    }
    Ok(())
}

// =============================================================================
// recent
// =============================================================================

pub fn state_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit.or_else(RecentStore::default_dir) {
        Some(dir) => Ok(dir),
        None => bail!("No config directory available; pass --state-dir"),
    }
}

pub fn recent_list(store: &mut RecentStore, kind: Option<RecentKind>) -> Result<()> {
    store.load()?;
    let list = store.get();
    let kinds: Vec<RecentKind> = match kind {
        Some(k) => vec![k],
        None => RecentKind::ALL.to_vec(),
    };

    for kind in kinds {
        println!("{}:", kind.label());
        let entries = list.entries(kind);
        if entries.is_empty() {
            println!("  (none)");
        }
        for entry in entries {
            println!("  {}  {}", entry.name, entry.path);
        }
    }
    Ok(())
}

pub fn recent_add(store: &mut RecentStore, kind: RecentKind, path: &str, name: Option<&str>) -> Result<()> {
    store.load()?;
    let entry = match name {
        Some(name) => RecentEntry::new(name.trim(), path),
        None => RecentEntry::from_path(path),
    };

    if store.get_mut().add(kind, entry) {
        store.save()?;
        println!("Added '{}'", path);
    } else {
        println!("'{}' is already listed or has an empty name", path);
    }
    Ok(())
}

pub fn recent_remove(store: &mut RecentStore, kind: RecentKind, path: &str) -> Result<()> {
    store.load()?;
    if store.get_mut().remove(kind, path) {
        store.save()?;
        println!("Removed '{}'", path);
    } else {
        println!("'{}' is not listed", path);
    }
    Ok(())
}

pub fn recent_rename(store: &mut RecentStore, kind: RecentKind, path: &str, name: &str) -> Result<()> {
    store.load()?;
    if store.get_mut().rename(kind, path, name) {
        store.save()?;
        println!("Renamed '{}' to '{}'", path, name.trim());
    } else {
        println!("'{}' is not listed", path);
    }
    Ok(())
}
