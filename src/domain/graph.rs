//! Project dependency graph
//!
//! Maps project names to their direct dependencies and answers transitive
//! closure queries. Uses petgraph for graph operations. Cycles are allowed:
//! co-dependent projects are common in real workspaces.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use petgraph::Direction;
use thiserror::Error;

use super::project::{ProjectNode, WebTargetKinds};

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Project declared twice: {0}")]
    DuplicateProject(String),
}

/// A dependency graph over workspace projects
///
/// Edges point from a project to the projects it depends on. Edge targets
/// without project metadata (external packages such as `npm:react`) are kept
/// as bare vertices so traversal still reaches them.
#[derive(Debug, Default)]
pub struct ProjectGraph {
    /// The underlying directed graph
    graph: DiGraph<String, ()>,

    /// Map from project name to node index
    node_map: HashMap<String, NodeIndex>,

    /// Project metadata for vertices that are real workspace projects
    projects: BTreeMap<String, ProjectNode>,
}

impl ProjectGraph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from project nodes and `(source, target)` edges
    pub fn from_parts<N, E, S>(nodes: N, edges: E) -> Result<Self, GraphError>
    where
        N: IntoIterator<Item = ProjectNode>,
        E: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut graph = Self::new();

        for node in nodes {
            graph.add_project(node)?;
        }

        for (source, target) in edges {
            graph.add_dependency(source.as_ref(), target.as_ref());
        }

        Ok(graph)
    }

    /// Adds a project with its metadata
    pub fn add_project(&mut self, node: ProjectNode) -> Result<(), GraphError> {
        if self.projects.contains_key(&node.name) {
            return Err(GraphError::DuplicateProject(node.name));
        }

        self.vertex(&node.name);
        self.projects.insert(node.name.clone(), node);
        Ok(())
    }

    /// Returns the vertex for a name, creating a bare one if needed
    fn vertex(&mut self, name: &str) -> NodeIndex {
        if let Some(idx) = self.node_map.get(name) {
            return *idx;
        }

        let idx = self.graph.add_node(name.to_string());
        self.node_map.insert(name.to_string(), idx);
        idx
    }

    /// Adds a dependency edge: `source` depends on `target`
    ///
    /// Repeated edges are ignored.
    pub fn add_dependency(&mut self, source: &str, target: &str) {
        let source_idx = self.vertex(source);
        let target_idx = self.vertex(target);

        if self.graph.find_edge(source_idx, target_idx).is_none() {
            self.graph.add_edge(source_idx, target_idx, ());
        }
    }

    /// Returns the direct dependencies of a project, in declaration order
    pub fn dependencies(&self, name: &str) -> Vec<String> {
        let idx = match self.node_map.get(name) {
            Some(idx) => *idx,
            None => return vec![],
        };

        // petgraph yields neighbors most-recent first
        let mut deps: Vec<String> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .filter_map(|n| self.graph.node_weight(n).cloned())
            .collect();
        deps.reverse();
        deps
    }

    /// Returns every name reachable from `root`, excluding `root` itself
    ///
    /// Breadth-first; each vertex is visited once, so cycles terminate.
    /// An unknown root yields an empty set.
    pub fn transitive_dependencies(&self, root: &str) -> BTreeSet<String> {
        let start = match self.node_map.get(root) {
            Some(idx) => *idx,
            None => return BTreeSet::new(),
        };

        let mut deps = BTreeSet::new();
        let mut bfs = Bfs::new(&self.graph, start);

        while let Some(idx) = bfs.next(&self.graph) {
            if idx == start {
                continue;
            }
            if let Some(name) = self.graph.node_weight(idx) {
                deps.insert(name.clone());
            }
        }

        deps
    }

    /// Returns project metadata, if the name is a workspace project
    pub fn project(&self, name: &str) -> Option<&ProjectNode> {
        self.projects.get(name)
    }

    /// Returns project metadata or an error naming the missing project
    pub fn require(&self, name: &str) -> Result<&ProjectNode, GraphError> {
        self.project(name)
            .ok_or_else(|| GraphError::ProjectNotFound(name.to_string()))
    }

    /// Iterates workspace projects ordered by name
    pub fn projects(&self) -> impl Iterator<Item = &ProjectNode> {
        self.projects.values()
    }

    /// Iterates the projects classified as web apps
    pub fn web_projects<'a>(
        &'a self,
        kinds: &'a WebTargetKinds,
    ) -> impl Iterator<Item = &'a ProjectNode> + 'a {
        self.projects().filter(move |p| p.is_web_like(kinds))
    }

    /// Returns true if the graph has a vertex with this name
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Returns the number of workspace projects
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Returns true if there are no workspace projects
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
