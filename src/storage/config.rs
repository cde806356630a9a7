//! Configuration handling for tailwind-sync
//!
//! Configuration is stored in `tailwind-sync.toml` at the workspace root
//! (project) and `~/.config/tailwind-sync/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{WebTargetKinds, DEFAULT_WEB_TARGETS};

/// Project configuration file name
pub const CONFIG_FILE: &str = "tailwind-sync.toml";

/// Files that mark a directory as a workspace root
const WORKSPACE_MARKERS: &[&str] = &[CONFIG_FILE, "nx.json"];

/// Environment variables consulted for the target project, in order
pub const DEFAULT_PROJECT_ENV_VARS: &[&str] = &[
    "NX_TASK_TARGET_PROJECT",
    "NX_WORKSPACE_TARGET_PROJECT",
    "TARGET_NAME",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Configuration for watch mode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds before re-syncing
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 500 }
    }
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project graph JSON (as written by `nx graph --file`), relative to the workspace root
    pub graph_file: Option<PathBuf>,

    /// Command used to export the graph when no graph file is configured
    pub nx_command: Vec<String>,

    /// Stylesheet path relative to each project root
    pub styles_path: Option<String>,

    /// Target names or executors that mark a project as a web app
    pub web_targets: Vec<String>,

    /// Environment variables naming the target project
    pub project_env_vars: Vec<String>,

    /// Restrict to the project containing the current directory
    pub infer_project_from_cwd: bool,

    /// Watch mode settings
    pub watch: WatchConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            graph_file: None,
            nx_command: vec!["npx".to_string(), "nx".to_string()],
            styles_path: None,
            web_targets: DEFAULT_WEB_TARGETS.iter().map(|s| s.to_string()).collect(),
            project_env_vars: DEFAULT_PROJECT_ENV_VARS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            infer_project_from_cwd: true,
            watch: WatchConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Returns the recognized web target kinds
    pub fn web_target_kinds(&self) -> WebTargetKinds {
        WebTargetKinds::new(self.web_targets.iter().cloned())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.graph_file.is_none() && self.nx_command.is_empty() {
            return Err(ConfigError::Invalid(
                "nx_command must not be empty when graph_file is unset".to_string(),
            ));
        }
        if self.web_targets.is_empty() {
            return Err(ConfigError::Invalid(
                "web_targets must list at least one target".to_string(),
            ));
        }
        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
}

impl Config {
    /// Loads configuration for a specific workspace
    pub fn for_workspace(workspace_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(workspace_root)?;

        Ok(Self { project, global })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "tailwind-sync", "tailwind-sync")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a workspace root
    fn load_project_config(workspace_root: &Path) -> Result<ProjectConfig> {
        let config_path = workspace_root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;

        config
            .validate()
            .with_context(|| format!("Invalid project config: {}", config_path.display()))?;

        Ok(config)
    }

    /// Finds the workspace root by walking up from `start`
    pub fn find_workspace_root(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if WORKSPACE_MARKERS
                .iter()
                .any(|marker| current.join(marker).is_file())
            {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }
}
