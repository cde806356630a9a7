//! # Storage Layer
//!
//! Everything that touches the filesystem or external processes.
//!
//! ## Files
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Stylesheets | CSS | `<project>/src/styles.css` (or configured) |
//! | Project graph | JSON (`nx graph --file`) | configured, or exported on demand |
//! | Config | TOML | `tailwind-sync.toml` at the workspace root |
//! | Global config | TOML | `~/.config/tailwind-sync/config.toml` |
//!
//! ## Writes
//!
//! [`FsTree`] replaces a stylesheet in one step (temp file + rename), so a
//! failed run never leaves a half-written file.
//!
//! ## Key Types
//!
//! - [`Workspace`] - Entry point: root discovery, config, tree, graph provider
//! - [`Tree`] - exists/read/write by workspace-relative path
//! - [`GraphProvider`] - Produces a [`crate::domain::ProjectGraph`]
//! - [`Config`] - Project and global configuration

mod config;
mod graph_file;
mod tree;
mod workspace;

pub use config::{
    Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, WatchConfig, CONFIG_FILE,
    DEFAULT_PROJECT_ENV_VARS,
};
pub use graph_file::{parse_graph, GraphFile, GraphProvider, NxGraphCommand, ProviderError};
pub use tree::{FsTree, MemoryTree, Tree, TreeError};
pub use workspace::{Workspace, WorkspaceError};
