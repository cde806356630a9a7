//! Project nodes and the web-app heuristic

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Target names and executors that mark a project as a web app
pub const DEFAULT_WEB_TARGETS: &[&str] = &[
    "serve",
    "build",
    "@nx/vite:build",
    "@nx/webpack:webpack",
    "@nx/next:build",
];

/// A declared build/serve target of a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Executor that runs the target (e.g. `@nx/vite:build`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,
}

/// A single build unit in the workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNode {
    pub name: String,

    /// Project root, relative to the workspace root
    pub root: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,

    #[serde(default)]
    pub targets: BTreeMap<String, Target>,
}

impl ProjectNode {
    /// Creates a node with no source root and no targets
    pub fn new(name: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            source_root: None,
            targets: BTreeMap::new(),
        }
    }

    /// Builder-style source root
    pub fn with_source_root(mut self, source_root: impl Into<String>) -> Self {
        self.source_root = Some(source_root.into());
        self
    }

    /// Builder-style target declaration
    pub fn with_target(mut self, name: impl Into<String>, executor: Option<&str>) -> Self {
        self.targets.insert(
            name.into(),
            Target {
                executor: executor.map(str::to_string),
            },
        );
        self
    }

    /// Returns true if any target name or executor is a recognized web kind
    pub fn is_web_like(&self, kinds: &WebTargetKinds) -> bool {
        self.targets.iter().any(|(name, target)| {
            kinds.contains(name)
                || target
                    .executor
                    .as_deref()
                    .map(|exec| kinds.contains(exec))
                    .unwrap_or(false)
        })
    }
}

/// The recognized list of build/serve target kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebTargetKinds(Vec<String>);

impl WebTargetKinds {
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(kinds.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.0.iter().any(|k| k == kind)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for WebTargetKinds {
    fn default() -> Self {
        Self::new(DEFAULT_WEB_TARGETS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_target_is_web_like() {
        let node = ProjectNode::new("app", "apps/app").with_target("build", None);
        assert!(node.is_web_like(&WebTargetKinds::default()));
    }

    #[test]
    fn executor_counts_as_kind() {
        let node = ProjectNode::new("app", "apps/app")
            .with_target("bundle", Some("@nx/webpack:webpack"));
        assert!(node.is_web_like(&WebTargetKinds::default()));
    }

    #[test]
    fn library_targets_are_not_web_like() {
        let node = ProjectNode::new("lib", "libs/lib")
            .with_target("lint", Some("@nx/eslint:lint"))
            .with_target("test", Some("@nx/vite:test"));
        assert!(!node.is_web_like(&WebTargetKinds::default()));
    }

    #[test]
    fn no_targets() {
        let node = ProjectNode::new("lib", "libs/lib");
        assert!(!node.is_web_like(&WebTargetKinds::default()));
    }

    #[test]
    fn custom_kinds() {
        let kinds = WebTargetKinds::new(["preview"]);
        let node = ProjectNode::new("app", "apps/app").with_target("preview", None);
        assert!(node.is_web_like(&kinds));

        let node = ProjectNode::new("app", "apps/app").with_target("build", None);
        assert!(!node.is_web_like(&kinds));
    }
}
