//! Target project resolution
//!
//! The project to sync comes from the first source that yields a non-empty
//! name: explicit flag, then invocation context, then environment hints.

use crate::domain::ProjectGraph;

/// Returns the first present, non-empty value
pub fn first_present<I>(sources: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    sources
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

/// Resolves the effective project name
///
/// `env` looks up one environment variable; variables are consulted in the
/// order given and only if nothing earlier matched. The name is not checked
/// against the graph here.
pub fn resolve_project_name<F>(
    explicit: Option<&str>,
    context: Option<&str>,
    env_vars: &[String],
    env: F,
) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let direct = [explicit, context]
        .into_iter()
        .map(|value| value.map(str::to_string));
    let hints = env_vars.iter().map(|var| env(var.as_str()));

    first_present(direct.chain(hints))
}

/// Finds the project whose root contains `cwd` (workspace-relative)
///
/// The deepest matching root wins. A workspace-root project (root `.` or
/// empty) never matches, so running from the workspace root means "all".
pub fn context_project(graph: &ProjectGraph, cwd: &str) -> Option<String> {
    let cwd = cwd.trim_matches('/');

    graph
        .projects()
        .filter_map(|node| {
            let root = node.root.trim_start_matches("./").trim_end_matches('/');
            if root.is_empty() || root == "." {
                return None;
            }

            let inside = cwd == root
                || cwd
                    .strip_prefix(root)
                    .map(|rest| rest.starts_with('/'))
                    .unwrap_or(false);

            inside.then_some((root.len(), node.name.clone()))
        })
        .max_by_key(|(depth, _)| *depth)
        .map(|(_, name)| name)
}
