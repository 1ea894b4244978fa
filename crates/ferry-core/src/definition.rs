//! Action definition files: TOML recipes keyed by normalized name.

use crate::error::{FerryError, Result};
use crate::io::atomic_write;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A named task recipe. The registry manages its lifecycle; an external
/// task runner executes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Human-readable name; spaces allowed. The backing file uses the
    /// underscore form.
    pub name: String,

    /// Recipe steps, run in order by the task runner.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<String>,

    /// Recipe fields this tool stores but never interprets.
    #[serde(flatten)]
    pub extra: toml::value::Table,
}

impl ActionDefinition {
    /// Empty definition for a freshly created action.
    pub fn template(name: &str) -> Self {
        Self {
            name: paths::display_name(name),
            steps: Vec::new(),
            extra: toml::value::Table::new(),
        }
    }

    /// Load a definition by user-facing name, returning it together with
    /// its backing file path.
    pub fn load(dir: &Path, name: &str) -> Result<(Self, PathBuf)> {
        let path = find_definition_file(dir, name)
            .ok_or_else(|| FerryError::ActionNotFound(name.to_string()))?;
        let raw = std::fs::read_to_string(&path)?;
        let def = toml::from_str(&raw)?;
        Ok((def, path))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let data = toml::to_string_pretty(self)?;
        atomic_write(path, data.as_bytes())
    }
}

/// Resolve a user-facing name to its definition file, extension-flexible.
/// `None` signals not-found.
pub fn find_definition_file(dir: &Path, name: &str) -> Option<PathBuf> {
    let stem = paths::normalize_name(name);
    let entries = std::fs::read_dir(dir).ok()?;
    let mut matches: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| p.file_stem().and_then(|s| s.to_str()) == Some(stem.as_str()))
        .collect();
    matches.sort();
    matches.into_iter().next()
}
