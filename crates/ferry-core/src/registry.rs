//! Lifecycle of named action definitions in the registry directory.
//!
//! Names map to files: spaces in user input become underscores on disk,
//! and at most one definition file exists per normalized name.

use crate::definition::{self, ActionDefinition};
use crate::error::{FerryError, Result};
use crate::io;
use crate::paths;
use crate::sink::Sink;
use crate::transfer::Transfer;
use std::path::{Path, PathBuf};
use std::process::Command;

pub struct ActionRegistry {
    dir: PathBuf,
}

impl ActionRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create an empty definition named by joining `args` with underscores.
    /// An existing file of the same name is overwritten.
    pub fn create(&self, args: &[String]) -> Result<PathBuf> {
        let name = paths::join_args(args);
        paths::validate_name(&name)?;
        io::ensure_dir(&self.dir)?;
        let path = paths::definition_path(&self.dir, &name);
        ActionDefinition::template(&name).write(&path)?;
        Ok(path)
    }

    /// Fetch a definition from `source` (`scheme:locator`) into the registry.
    ///
    /// Only the content network scheme is fetched. A recognized
    /// source-hosting scheme and a fully unknown scheme both report and
    /// return success.
    pub fn import(
        &self,
        source: &str,
        args: &[String],
        transfer: &Transfer,
        sink: &dyn Sink,
    ) -> Result<()> {
        let name = paths::join_args(args);
        paths::validate_name(&name)?;
        let mut dest = self.dir.join(&name);
        if dest.extension().is_none() {
            dest.set_extension(paths::DEFAULT_EXT);
        }

        let (scheme, locator) = source.split_once(':').unwrap_or((source, ""));
        if scheme == "ipfs" {
            io::ensure_dir(&self.dir)?;
            return transfer.get(locator, &dest, sink);
        }
        if scheme.contains("github") {
            sink.emit("github sources are not fetched from here; clone the repository instead");
            return Ok(());
        }
        println!("I do not know how to get that file. Sorry.");
        Ok(())
    }

    /// Upload the backing file for `name`, returning the content hash.
    pub fn export(&self, name: &str, transfer: &Transfer, sink: &dyn Sink) -> Result<String> {
        let (_, path) = ActionDefinition::load(&self.dir, name)?;
        let hash = transfer.put(&path, false, sink)?;
        sink.emit(&hash);
        Ok(hash)
    }

    /// Open the definition for `name` in the user's editor, blocking until
    /// the editor exits.
    pub fn edit(&self, name: &str) -> Result<()> {
        let path = definition::find_definition_file(&self.dir, name)
            .unwrap_or_else(|| paths::definition_path(&self.dir, name));
        let editor = std::env::var("VISUAL")
            .or_else(|_| std::env::var("EDITOR"))
            .unwrap_or_else(|_| "vi".to_string());
        let status = Command::new(&editor)
            .arg(&path)
            .status()
            .map_err(|e| FerryError::EditorFailed(e.to_string()))?;
        if !status.success() {
            return Err(FerryError::EditorFailed(format!(
                "{editor} exited with {status}"
            )));
        }
        Ok(())
    }

    /// Rename `old` to `new`. The extension is preserved unless `new`
    /// carries an explicit one; the stored `name` field becomes the
    /// human-readable form of the new name.
    ///
    /// The new file is written before the old one is removed, so an
    /// interrupted rename leaves a duplicate, never nothing.
    pub fn rename(&self, old: &str, new: &str, sink: &dyn Sink) -> Result<()> {
        if old == new {
            return Err(FerryError::SameName);
        }
        let old_name = paths::normalize_name(old);
        let new_name = paths::normalize_name(new);
        paths::validate_name(&new_name)?;

        let (mut def, old_path) = ActionDefinition::load(&self.dir, &old_name)?;

        let new_ext = Path::new(&new_name).extension().and_then(|e| e.to_str());
        let new_base = Path::new(&new_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&new_name)
            .to_string();

        let new_path = if new_base == old_name {
            // Same base: only the extension changes.
            match new_ext {
                Some(ext) => old_path.with_extension(ext),
                None => old_path.clone(),
            }
        } else {
            let ext = new_ext
                .or_else(|| old_path.extension().and_then(|e| e.to_str()))
                .unwrap_or(paths::DEFAULT_EXT);
            self.dir.join(&new_base).with_extension(ext)
        };

        if new_path == old_path {
            sink.emit("old and new names resolve to the same file; not renaming");
            return Ok(());
        }

        def.name = paths::display_name(&new_base);
        def.write(&new_path)?;
        std::fs::remove_file(&old_path)?;
        Ok(())
    }

    /// Sorted names of every definition in the registry.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Remove an action. Without `delete_file` this only resolves the name;
    /// removing an absent definition is success, not an error.
    pub fn remove(&self, args: &[String], delete_file: bool, sink: &dyn Sink) -> Result<()> {
        let name = paths::join_args(args);
        if !delete_file {
            return Ok(());
        }
        match definition::find_definition_file(&self.dir, &name) {
            Some(path) => {
                sink.emit(&format!("removing {}", path.display()));
                std::fs::remove_file(&path)?;
                Ok(())
            }
            None => Ok(()),
        }
    }
}
