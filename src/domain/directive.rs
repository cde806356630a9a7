//! Tailwind `@source` directives
//!
//! A directive tells Tailwind to scan an additional directory for class
//! names. Paths are POSIX-separated and relative to the stylesheet's own
//! directory.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use super::graph::ProjectGraph;

/// A single normalized `@source '<path>';` line
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceDirective {
    path: String,
}

impl SourceDirective {
    /// Creates a directive for an already-relative POSIX path
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Builds the directive pointing from a stylesheet to a project root
    ///
    /// Both paths are workspace-relative.
    pub fn between(stylesheet: &str, project_root: &str) -> Self {
        let from_dir = normalize(Path::new(stylesheet))
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let to = normalize(Path::new(project_root));

        let rel = pathdiff::diff_paths(&to, &from_dir).unwrap_or(to);
        let posix = to_posix(&rel);
        let path = posix.strip_prefix("./").unwrap_or(&posix);

        // Root is the stylesheet's own directory
        if path.is_empty() {
            return Self::new(".");
        }

        Self::new(path)
    }

    /// The relative path this directive scans
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parses a line of the form `@source '<path>';`
    ///
    /// Either quote style is accepted and surrounding whitespace is
    /// ignored. Anything else is ordinary stylesheet content.
    pub fn parse_line(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix("@source")?;

        // At least one whitespace character after the at-rule name
        let trimmed = rest.trim_start();
        if trimmed.len() == rest.len() {
            return None;
        }

        let mut chars = trimmed.chars();
        if !matches!(chars.next(), Some('\'' | '"')) {
            return None;
        }
        let inner = chars.as_str().strip_suffix(';')?;
        let path = inner.strip_suffix(['\'', '"'])?;

        if path.is_empty() || path.contains(['\'', '"']) {
            return None;
        }

        Some(Self::new(path))
    }

    /// Returns true if the line is a directive
    pub fn is_directive_line(line: &str) -> bool {
        Self::parse_line(line).is_some()
    }
}

impl fmt::Display for SourceDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@source '{}';", self.path)
    }
}

/// Builds the sorted, deduplicated directive lines for a stylesheet
///
/// `owner` is never given a directive pointing at itself, and dependencies
/// without a root in the graph are skipped.
pub fn build_directives<'a, I>(
    graph: &ProjectGraph,
    deps: I,
    stylesheet: &str,
    owner: &str,
) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let lines: BTreeSet<String> = deps
        .into_iter()
        .filter(|dep| dep.as_str() != owner)
        .filter_map(|dep| graph.project(dep))
        .filter(|node| !node.root.is_empty())
        .map(|node| SourceDirective::between(stylesheet, &node.root).to_string())
        .collect();

    lines.into_iter().collect()
}

/// Lexically drops `.` components and folds `..` where possible
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }

    out
}

/// Joins path components with forward slashes
fn to_posix(path: &Path) -> String {
    let parts: Vec<_> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().replace('\\', "/"))
        .collect();

    let joined = parts.join("/");
    // A leading root component already renders as "/"
    if joined.starts_with("//") {
        joined[1..].to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProjectNode;

    #[test]
    fn display_format() {
        assert_eq!(
            SourceDirective::new("../../libs/ui").to_string(),
            "@source '../../libs/ui';"
        );
    }

    #[test]
    fn between_sibling_trees() {
        let d = SourceDirective::between("apps/web/src/styles.css", "libs/ui");
        assert_eq!(d.path(), "../../../libs/ui");
    }

    #[test]
    fn between_ignores_dot_components() {
        let d = SourceDirective::between("./apps/web/src/styles.css", "./libs/ui/");
        assert_eq!(d.path(), "../../../libs/ui");
    }

    #[test]
    fn between_nested_below_stylesheet() {
        let d = SourceDirective::between("styles.css", "libs/ui");
        assert_eq!(d.path(), "libs/ui");
    }

    #[test]
    fn between_workspace_root_project() {
        let d = SourceDirective::between("apps/web/src/styles.css", ".");
        assert_eq!(d.path(), "../../..");
    }

    #[test]
    fn between_own_directory() {
        let d = SourceDirective::between("libs/ui/styles.css", "libs/ui");
        assert_eq!(d.to_string(), "@source '.';");
    }

    #[test]
    fn parse_single_and_double_quotes() {
        assert_eq!(
            SourceDirective::parse_line("@source '../libs/a';"),
            Some(SourceDirective::new("../libs/a"))
        );
        assert_eq!(
            SourceDirective::parse_line("  @source \"../libs/a\";  "),
            Some(SourceDirective::new("../libs/a"))
        );
    }

    #[test]
    fn parse_rejects_other_shapes() {
        assert!(!SourceDirective::is_directive_line("@source'../a';"));
        assert!(!SourceDirective::is_directive_line("@source '../a'"));
        assert!(!SourceDirective::is_directive_line("@source '';"));
        assert!(!SourceDirective::is_directive_line("@source ../a;"));
        assert!(!SourceDirective::is_directive_line("@import 'tailwindcss';"));
        assert!(!SourceDirective::is_directive_line("/* @source '../a'; */"));
        assert!(!SourceDirective::is_directive_line("@source 'a' 'b';"));
    }

    #[test]
    fn build_sorted_and_skips_unknown() {
        let graph = ProjectGraph::from_parts(
            [
                ProjectNode::new("app", "apps/app"),
                ProjectNode::new("zeta", "libs/zeta"),
                ProjectNode::new("alpha", "libs/alpha"),
            ],
            [("app", "zeta"), ("app", "alpha"), ("app", "npm:react")],
        )
        .unwrap();

        let deps = graph.transitive_dependencies("app");
        let lines = build_directives(&graph, &deps, "apps/app/src/styles.css", "app");

        assert_eq!(
            lines,
            vec![
                "@source '../../../libs/alpha';".to_string(),
                "@source '../../../libs/zeta';".to_string(),
            ]
        );
    }

    #[test]
    fn build_excludes_owner() {
        let graph = ProjectGraph::from_parts(
            [ProjectNode::new("app", "apps/app"), ProjectNode::new("lib", "libs/lib")],
            [("app", "lib"), ("lib", "app")],
        )
        .unwrap();

        let deps: BTreeSet<String> = ["app".to_string(), "lib".to_string()].into();
        let lines = build_directives(&graph, &deps, "apps/app/src/styles.css", "app");

        assert_eq!(lines, vec!["@source '../../../libs/lib';".to_string()]);
    }
}
