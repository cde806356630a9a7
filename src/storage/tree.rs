//! File tree abstraction
//!
//! Stylesheets are addressed by workspace-relative POSIX paths. [`FsTree`]
//! reads and writes the real workspace; [`MemoryTree`] keeps everything in
//! memory and records writes.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    #[error("Path escapes the workspace: {0}")]
    OutsideWorkspace(String),
}

/// Exists/read/write access to workspace files
pub trait Tree {
    /// Returns true if a file exists at the path
    fn exists(&self, path: &str) -> bool;

    /// Reads a file, or `None` if it does not exist
    fn read(&self, path: &str) -> Result<Option<String>>;

    /// Replaces the full contents of a file
    fn write(&mut self, path: &str, content: &str) -> Result<()>;
}

/// A tree rooted at a workspace directory on disk
#[derive(Debug, Clone)]
pub struct FsTree {
    root: PathBuf,
}

impl FsTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the workspace root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a workspace-relative path to a filesystem path
    pub fn resolve(&self, path: &str) -> Result<PathBuf, TreeError> {
        let rel = Path::new(path);

        if rel.is_absolute() || rel.components().any(|c| c == Component::ParentDir) {
            return Err(TreeError::OutsideWorkspace(path.to_string()));
        }

        Ok(self.root.join(rel))
    }
}

impl Tree for FsTree {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }

    fn read(&self, path: &str) -> Result<Option<String>> {
        let full = self.resolve(path)?;

        if !full.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&full)
            .with_context(|| format!("Failed to read {}", full.display()))?;
        Ok(Some(content))
    }

    fn write(&mut self, path: &str, content: &str) -> Result<()> {
        let full = self.resolve(path)?;
        let parent = full
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        fs::create_dir_all(&parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

        // Write to a temp file in the same directory, then rename over
        let mut temp = NamedTempFile::new_in(&parent)
            .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
        temp.write_all(content.as_bytes())
            .context("Failed to write stylesheet")?;
        temp.flush().context("Failed to flush stylesheet")?;

        // Temp files are created owner-only; keep the stylesheet's mode
        if let Ok(metadata) = fs::metadata(&full) {
            temp.as_file()
                .set_permissions(metadata.permissions())
                .with_context(|| format!("Failed to set permissions on {}", full.display()))?;
        }

        temp.persist(&full)
            .with_context(|| format!("Failed to replace {}", full.display()))?;

        Ok(())
    }
}

/// An in-memory tree that records every write
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    files: BTreeMap<String, String>,
    writes: Vec<String>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style file insertion (not counted as a write)
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Returns the current contents of a file
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Paths written so far, in order
    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    /// Forgets recorded writes
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }
}

impl Tree for MemoryTree {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn read(&self, path: &str) -> Result<Option<String>> {
        Ok(self.files.get(path).cloned())
    }

    fn write(&mut self, path: &str, content: &str) -> Result<()> {
        self.files.insert(path.to_string(), content.to_string());
        self.writes.push(path.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn fs_tree_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut tree = FsTree::new(dir.path());

        assert!(!tree.exists("apps/web/src/styles.css"));
        assert_eq!(tree.read("apps/web/src/styles.css").unwrap(), None);

        tree.write("apps/web/src/styles.css", "@import 'tailwindcss';\n")
            .unwrap();

        assert!(tree.exists("apps/web/src/styles.css"));
        assert_eq!(
            tree.read("apps/web/src/styles.css").unwrap().as_deref(),
            Some("@import 'tailwindcss';\n")
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("apps/web/src/styles.css")).unwrap(),
            "@import 'tailwindcss';\n"
        );
    }

    #[test]
    fn fs_tree_overwrites() {
        let dir = TempDir::new().unwrap();
        let mut tree = FsTree::new(dir.path());

        tree.write("styles.css", "old").unwrap();
        tree.write("styles.css", "new").unwrap();

        assert_eq!(tree.read("styles.css").unwrap().as_deref(), Some("new"));
        // No temp files left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn overwrite_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("styles.css");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let mut tree = FsTree::new(dir.path());
        tree.write("styles.css", "new").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn directories_are_not_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("styles.css")).unwrap();

        let tree = FsTree::new(dir.path());
        assert!(!tree.exists("styles.css"));
    }

    #[test]
    fn escaping_paths_rejected() {
        let dir = TempDir::new().unwrap();
        let mut tree = FsTree::new(dir.path());

        assert_eq!(
            tree.resolve("../outside.css").unwrap_err(),
            TreeError::OutsideWorkspace("../outside.css".to_string())
        );
        assert!(!tree.exists("../outside.css"));
        assert!(tree.write("../outside.css", "x").is_err());
    }

    #[test]
    fn memory_tree_records_writes() {
        let mut tree = MemoryTree::new().with_file("a.css", "a");

        assert!(tree.exists("a.css"));
        assert!(tree.writes().is_empty());

        tree.write("a.css", "b").unwrap();
        assert_eq!(tree.get("a.css"), Some("b"));
        assert_eq!(tree.writes(), ["a.css".to_string()]);

        tree.clear_writes();
        assert!(tree.writes().is_empty());
    }
}
