//! Project graph providers
//!
//! The graph is read from the JSON document `nx graph --file=<path>` writes,
//! either from a file already on disk or by running the nx command.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{ProjectGraph, ProjectNode, Target};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Graph command is empty")]
    EmptyCommand,

    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Anything that can produce the workspace project graph
pub trait GraphProvider {
    /// Builds a fresh graph snapshot
    fn load(&self) -> Result<ProjectGraph>;

    /// Short description for diagnostics
    fn describe(&self) -> String;
}

/// Top-level document; the `graph` wrapper is optional
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GraphDocument {
    Wrapped { graph: RawGraph },
    Bare(RawGraph),
}

#[derive(Debug, Deserialize)]
struct RawGraph {
    nodes: BTreeMap<String, RawNode>,

    #[serde(default)]
    dependencies: BTreeMap<String, Vec<RawEdge>>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    data: RawNodeData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNodeData {
    #[serde(default)]
    root: String,

    #[serde(default)]
    source_root: Option<String>,

    #[serde(default)]
    targets: BTreeMap<String, Target>,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    target: String,
}

/// Parses a graph JSON document into a [`ProjectGraph`]
pub fn parse_graph(json: &str) -> Result<ProjectGraph> {
    let document: GraphDocument =
        serde_json::from_str(json).context("Failed to parse project graph JSON")?;

    let raw = match document {
        GraphDocument::Wrapped { graph } => graph,
        GraphDocument::Bare(graph) => graph,
    };

    let nodes = raw.nodes.into_iter().map(|(name, node)| ProjectNode {
        name,
        root: node.data.root,
        source_root: node.data.source_root,
        targets: node.data.targets,
    });

    let edges = raw.dependencies.iter().flat_map(|(source, edges)| {
        edges
            .iter()
            .map(move |edge| (source.as_str(), edge.target.as_str()))
    });

    ProjectGraph::from_parts(nodes, edges).context("Invalid project graph")
}

/// Reads the graph from a JSON file
#[derive(Debug, Clone)]
pub struct GraphFile {
    path: PathBuf,
}

impl GraphFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GraphProvider for GraphFile {
    fn load(&self) -> Result<ProjectGraph> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read project graph: {}", self.path.display()))?;

        parse_graph(&content)
            .with_context(|| format!("Failed to load project graph: {}", self.path.display()))
    }

    fn describe(&self) -> String {
        format!("graph file {}", self.path.display())
    }
}

/// Exports the graph by running `<command> graph --file=<temp>`
#[derive(Debug, Clone)]
pub struct NxGraphCommand {
    workspace_root: PathBuf,
    command: Vec<String>,
}

impl NxGraphCommand {
    pub fn new(workspace_root: impl Into<PathBuf>, command: Vec<String>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            command,
        }
    }
}

impl GraphProvider for NxGraphCommand {
    fn load(&self) -> Result<ProjectGraph> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or(ProviderError::EmptyCommand)?;

        let export = tempfile::Builder::new()
            .prefix("tailwind-sync-graph-")
            .suffix(".json")
            .tempfile()
            .context("Failed to create temp file for graph export")?;

        let output = Command::new(program)
            .args(args)
            .arg("graph")
            .arg(format!("--file={}", export.path().display()))
            .current_dir(&self.workspace_root)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to run {}", self.describe()))?;

        if !output.status.success() {
            return Err(ProviderError::CommandFailed {
                command: self.command.join(" "),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        GraphFile::new(export.path()).load()
    }

    fn describe(&self) -> String {
        format!("`{} graph`", self.command.join(" "))
    }
}
