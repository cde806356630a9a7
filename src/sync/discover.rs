//! Stylesheet discovery
//!
//! Picks the web-like projects to sync and locates their stylesheets.

use crate::domain::{ProjectGraph, ProjectNode, WebTargetKinds};
use crate::storage::Tree;

/// Stylesheet name under a project's source root
const DEFAULT_STYLESHEET: &str = "styles.css";

/// A project whose stylesheet will be patched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetTarget<'g> {
    pub name: String,
    pub node: &'g ProjectNode,
    /// Workspace-relative POSIX path of the stylesheet
    pub styles_path: String,
}

/// Joins workspace-relative POSIX path segments
fn join(base: &str, rel: &str) -> String {
    let base = base.trim_end_matches(['/', '\\']);
    let joined = if base.is_empty() || base == "." {
        rel.to_string()
    } else {
        format!("{}/{}", base, rel)
    };

    let posix = joined.replace('\\', "/");
    match posix.strip_prefix("./") {
        Some(stripped) => stripped.to_string(),
        None => posix,
    }
}

/// Candidate stylesheet path for a project, before checking existence
///
/// An override is taken relative to the project root. Otherwise
/// `<sourceRoot>/styles.css`, falling back to `<root>/src/styles.css`.
pub fn stylesheet_candidate(node: &ProjectNode, override_rel: Option<&str>) -> String {
    match (override_rel, node.source_root.as_deref()) {
        (Some(rel), _) => join(&node.root, rel),
        (None, Some(source_root)) => join(source_root, DEFAULT_STYLESHEET),
        (None, None) => join(&node.root, &format!("src/{}", DEFAULT_STYLESHEET)),
    }
}

/// Resolves the stylesheet path, or `None` if the file does not exist
pub fn resolve_styles_path<T>(tree: &T, node: &ProjectNode, override_rel: Option<&str>) -> Option<String>
where
    T: Tree + ?Sized,
{
    let candidate = stylesheet_candidate(node, override_rel);
    tree.exists(&candidate).then_some(candidate)
}

/// Lists the projects to sync, ordered by name
///
/// A project qualifies when it is web-like, matches `project` (if given),
/// and has an existing stylesheet. Naming a project does not bypass the
/// web-like check.
pub fn discover_targets<'g, T>(
    tree: &T,
    graph: &'g ProjectGraph,
    project: Option<&str>,
    styles_override: Option<&str>,
    kinds: &WebTargetKinds,
) -> Vec<StylesheetTarget<'g>>
where
    T: Tree + ?Sized,
{
    graph
        .projects()
        .filter(|node| project.map(|name| node.name == name).unwrap_or(true))
        .filter(|node| node.is_web_like(kinds))
        .filter_map(|node| {
            resolve_styles_path(tree, node, styles_override).map(|styles_path| StylesheetTarget {
                name: node.name.clone(),
                node,
                styles_path,
            })
        })
        .collect()
}
