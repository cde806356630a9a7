//! Workspace access
//!
//! Locates the workspace root and hands out the file tree and the graph
//! provider configured for it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, FsTree, GraphFile, GraphProvider, NxGraphCommand};

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Not in a workspace. Add tailwind-sync.toml or nx.json at the workspace root.")]
    NotInWorkspace,

    #[error("Workspace root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// A monorepo workspace
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens the workspace at the given root
    ///
    /// The root is canonicalized so `..` segments and symlinks never hide a
    /// path inside it from [`Workspace::relative_path`].
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.is_dir() {
            return Err(WorkspaceError::NotADirectory(root).into());
        }

        let root = root
            .canonicalize()
            .with_context(|| format!("Failed to resolve workspace root: {}", root.display()))?;

        let config = Config::for_workspace(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the workspace containing the current directory
    pub fn open_current() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let root = Config::find_workspace_root(&cwd).ok_or(WorkspaceError::NotInWorkspace)?;

        Self::open(root)
    }

    /// Returns the workspace root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a file tree over the workspace
    pub fn tree(&self) -> FsTree {
        FsTree::new(&self.root)
    }

    /// Resolves the graph file path, if one is configured or given
    pub fn graph_file(&self, override_path: Option<&Path>) -> Option<PathBuf> {
        override_path
            .map(Path::to_path_buf)
            .or_else(|| self.config.project.graph_file.clone())
            .map(|path| {
                if path.is_absolute() {
                    path
                } else {
                    self.root.join(path)
                }
            })
    }

    /// Returns the graph provider: a graph file if known, else the nx command
    pub fn graph_provider(&self, override_path: Option<&Path>) -> Box<dyn GraphProvider> {
        match self.graph_file(override_path) {
            Some(path) => Box::new(GraphFile::new(path)),
            None => Box::new(NxGraphCommand::new(
                &self.root,
                self.config.project.nx_command.clone(),
            )),
        }
    }

    /// Returns a workspace-relative POSIX path for a location inside it
    ///
    /// `path` should be absolute and canonical, like the root.
    pub fn relative_path(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}
