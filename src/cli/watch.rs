//! Watch mode
//!
//! Syncs once, then re-syncs whenever the project graph may have changed:
//! the graph file if one is configured, otherwise the workspace's project
//! manifests.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;

use super::app::SyncArgs;
use super::output::Output;
use super::sync_cmd::{load_graph, print_report, sync_options};
use crate::storage::Workspace;
use crate::sync::{sync_stylesheets, SyncMode, SyncReport};

/// Files whose changes can alter the project graph
const GRAPH_INPUTS: &[&str] = &["project.json", "package.json", "tsconfig.base.json", "nx.json"];

/// Directory names never worth reacting to
const IGNORED_DIRS: &[&str] = &["node_modules", ".git", ".nx", "dist", "tmp", ".angular"];

/// What a change must touch to trigger a re-sync
enum WatchTarget {
    GraphFile(PathBuf),
    /// Project manifests anywhere below the workspace root
    Manifests(PathBuf),
}

impl WatchTarget {
    fn is_relevant(&self, path: &Path) -> bool {
        match self {
            WatchTarget::GraphFile(graph) => path.file_name() == graph.file_name(),
            WatchTarget::Manifests(root) => {
                // Only directories inside the workspace count as ignored
                let rel = path.strip_prefix(root).unwrap_or(path);
                let ignored = rel.components().any(|c| {
                    IGNORED_DIRS
                        .iter()
                        .any(|dir| c.as_os_str() == std::ffi::OsStr::new(dir))
                });

                !ignored
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .map(|n| GRAPH_INPUTS.contains(&n))
                        .unwrap_or(false)
            }
        }
    }
}

fn try_sync(
    output: &Output,
    workspace: &Workspace,
    graph_override: Option<&Path>,
    args: &SyncArgs,
) -> Result<SyncReport> {
    let graph = load_graph(output, workspace, graph_override)?;
    let options = sync_options(output, workspace, &graph, args, SyncMode::Write)?;
    let mut tree = workspace.tree();
    sync_stylesheets(&mut tree, &graph, &options)
}

/// Runs one full sync pass; errors are reported, not fatal
fn sync_once(output: &Output, workspace: &Workspace, graph_override: Option<&Path>, args: &SyncArgs) {
    match try_sync(output, workspace, graph_override, args) {
        Ok(report) if report.changed_count() > 0 || output.is_json() => print_report(output, &report),
        Ok(_) => output.timestamped("In sync"),
        Err(e) => output.error(&format!("{:#}", e)),
    }
}

pub fn run(
    output: &Output,
    workspace: &Workspace,
    graph_override: Option<&Path>,
    args: &SyncArgs,
) -> Result<()> {
    let config = &workspace.config().project.watch;

    let (target, watch_path, mode) = match workspace.graph_file(graph_override) {
        Some(graph) => {
            // Editors often replace the file, so watch its directory
            let dir = graph
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| workspace.root().to_path_buf());
            (WatchTarget::GraphFile(graph), dir, RecursiveMode::NonRecursive)
        }
        None => (
            WatchTarget::Manifests(workspace.root().to_path_buf()),
            workspace.root().to_path_buf(),
            RecursiveMode::Recursive,
        ),
    };

    sync_once(output, workspace, graph_override, args);

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(config.debounce_ms), tx)
        .context("Failed to create file watcher")?;

    debouncer
        .watcher()
        .watch(&watch_path, mode)
        .with_context(|| format!("Failed to watch {}", watch_path.display()))?;

    output.timestamped(&format!(
        "Watching {} (debounce: {}ms, Ctrl-C to stop)",
        watch_path.display(),
        config.debounce_ms
    ));

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().filter(|e| target.is_relevant(&e.path)).count();
                if relevant == 0 {
                    continue;
                }

                output.verbose_ctx("watch", &format!("Detected {} change(s)", relevant));
                sync_once(output, workspace, graph_override, args);
            }
            Ok(Err(e)) => output.error(&format!("Watch error: {:?}", e)),
            // Sender dropped: the watcher is gone
            Err(_) => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_file_events() {
        let target = WatchTarget::GraphFile(PathBuf::from("/ws/dist/graph.json"));

        assert!(target.is_relevant(Path::new("/ws/dist/graph.json")));
        assert!(!target.is_relevant(Path::new("/ws/dist/other.json")));
    }

    #[test]
    fn manifest_events() {
        let target = WatchTarget::Manifests(PathBuf::from("/ws"));

        assert!(target.is_relevant(Path::new("/ws/apps/web/project.json")));
        assert!(target.is_relevant(Path::new("/ws/libs/ui/package.json")));
        assert!(target.is_relevant(Path::new("/ws/nx.json")));
        assert!(!target.is_relevant(Path::new("/ws/apps/web/src/styles.css")));
        assert!(!target.is_relevant(Path::new("/ws/node_modules/react/package.json")));
        assert!(!target.is_relevant(Path::new("/ws/.nx/cache/project.json")));
    }

    #[test]
    fn workspace_below_ignored_dir_names() {
        let target = WatchTarget::Manifests(PathBuf::from("/tmp/ws"));
        assert!(target.is_relevant(Path::new("/tmp/ws/apps/web/project.json")));
        assert!(!target.is_relevant(Path::new("/tmp/ws/tmp/project.json")));
        assert!(!target.is_relevant(Path::new("/tmp/ws/node_modules/a/package.json")));

        let target = WatchTarget::Manifests(PathBuf::from("/home/me/dist/ws"));
        assert!(target.is_relevant(Path::new("/home/me/dist/ws/libs/ui/project.json")));
        assert!(!target.is_relevant(Path::new("/home/me/dist/ws/dist/libs/ui/package.json")));
    }
}
