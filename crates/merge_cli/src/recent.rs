//! Persisted quick-access lists of templates, data files, and output folders

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const FILE_NAME: &str = "recent.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RecentKind {
    Template,
    Data,
    Output,
}

impl RecentKind {
    pub const ALL: [RecentKind; 3] = [RecentKind::Template, RecentKind::Data, RecentKind::Output];

    pub fn label(&self) -> &'static str {
        match self {
            RecentKind::Template => "Templates",
            RecentKind::Data => "Data files",
            RecentKind::Output => "Output folders",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentEntry {
    pub name: String,
    pub path: String,
}

impl RecentEntry {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Entry named after the last component of `path`
    pub fn from_path(path: &str) -> Self {
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string());
        Self::new(name, path)
    }
}

/// The three lists, each unique by path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecentList {
    pub templates: Vec<RecentEntry>,
    pub data_files: Vec<RecentEntry>,
    pub output_folders: Vec<RecentEntry>,
}

impl RecentList {
    pub fn entries(&self, kind: RecentKind) -> &[RecentEntry] {
        match kind {
            RecentKind::Template => &self.templates,
            RecentKind::Data => &self.data_files,
            RecentKind::Output => &self.output_folders,
        }
    }

    fn entries_mut(&mut self, kind: RecentKind) -> &mut Vec<RecentEntry> {
        match kind {
            RecentKind::Template => &mut self.templates,
            RecentKind::Data => &mut self.data_files,
            RecentKind::Output => &mut self.output_folders,
        }
    }

    /// Add an entry. Returns false if name or path is empty or the path is already listed.
    pub fn add(&mut self, kind: RecentKind, entry: RecentEntry) -> bool {
        if entry.name.is_empty() || entry.path.is_empty() {
            return false;
        }
        let entries = self.entries_mut(kind);
        if entries.iter().any(|e| e.path == entry.path) {
            return false;
        }
        entries.push(entry);
        true
    }

    /// Remove the entry with this path. Returns whether anything was removed.
    pub fn remove(&mut self, kind: RecentKind, path: &str) -> bool {
        let entries = self.entries_mut(kind);
        let before = entries.len();
        entries.retain(|e| e.path != path);
        entries.len() != before
    }

    /// Rename the entry with this path; the new name is trimmed
    pub fn rename(&mut self, kind: RecentKind, path: &str, name: &str) -> bool {
        match self.entries_mut(kind).iter_mut().find(|e| e.path == path) {
            Some(entry) => {
                entry.name = name.trim().to_string();
                true
            }
            None => false,
        }
    }
}

/// Loads and saves the recent list as JSON in a state directory
pub struct RecentStore {
    path: PathBuf,
    current: RecentList,
}

impl RecentStore {
    pub fn new(state_dir: PathBuf) -> Self {
        Self {
            path: state_dir.join(FILE_NAME),
            current: RecentList::default(),
        }
    }

    /// `<config dir>/docx-merge`, if the platform has a config directory
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("docx-merge"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the list from disk, falling back to an empty list if the file
    /// is missing or unreadable as JSON
    pub fn load(&mut self) -> Result<&RecentList> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)
                .with_context(|| format!("Failed to read '{}'", self.path.display()))?;
            match serde_json::from_str::<RecentList>(&content) {
                Ok(list) => {
                    self.current = list;
                }
                Err(e) => {
                    tracing::warn!("Failed to parse recent list, using defaults: {}", e);
                    self.current = RecentList::default();
                }
            }
        } else {
            self.current = RecentList::default();
        }
        Ok(&self.current)
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create '{}'", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write '{}'", self.path.display()))?;
        Ok(())
    }

    pub fn get(&self) -> &RecentList {
        &self.current
    }

    pub fn get_mut(&mut self) -> &mut RecentList {
        &mut self.current
    }
}
