//! # Stylesheet Directive Synchronizer
//!
//! One-shot transformation that keeps each web app's `@source` block in line
//! with its transitive dependencies.
//!
//! ## Pipeline
//!
//! 1. [`resolve_project_name`] - pick one project, or all
//! 2. [`discover_targets`] - web-like projects with an existing stylesheet
//! 3. [`ProjectGraph::transitive_dependencies`] - closure per project
//! 4. [`build_directives`] - sorted `@source` lines
//! 5. [`stylesheet::patch`] - rewrite only when the set differs
//!
//! Graph and file-system errors propagate unchanged. Projects are processed
//! one at a time, so a failure leaves earlier projects updated.

mod discover;
mod resolve;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::stylesheet::{self, PatchOutcome};
use crate::domain::{build_directives, ProjectGraph, WebTargetKinds};
use crate::storage::Tree;

pub use discover::{discover_targets, resolve_styles_path, stylesheet_candidate, StylesheetTarget};
pub use resolve::{context_project, first_present, resolve_project_name};

/// Whether changed stylesheets are written or only reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    #[default]
    Write,
    Check,
}

/// Inputs for one synchronizer run
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Already-resolved project name; `None` means every web-like project
    pub project: Option<String>,

    /// Stylesheet path relative to each project root
    pub styles_path: Option<String>,

    pub mode: SyncMode,

    pub web_targets: WebTargetKinds,
}

/// What happened to one project's stylesheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Rewritten with the new directive block
    Updated,
    /// Directives already matched
    Unchanged,
    /// No `@import 'tailwindcss';`, left alone
    Skipped,
    /// Out of date, not written (check mode)
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectOutcome {
    pub project: String,
    pub stylesheet: String,
    pub status: ProjectStatus,
    pub directives: Vec<String>,
}

/// Result of a synchronizer run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub mode: SyncMode,
    pub requested_project: Option<String>,
    pub projects: Vec<ProjectOutcome>,
    /// Human-readable summary; `None` when everything is in sync
    pub out_of_sync_message: Option<String>,
}

impl SyncReport {
    /// Number of projects with the given status
    pub fn count(&self, status: ProjectStatus) -> usize {
        self.projects.iter().filter(|p| p.status == status).count()
    }

    /// Number of stylesheets written
    pub fn changed_count(&self) -> usize {
        self.count(ProjectStatus::Updated)
    }

    /// True if check mode found stylesheets needing an update
    pub fn is_stale(&self) -> bool {
        self.count(ProjectStatus::Stale) > 0
    }
}

/// Message when a requested project has no stylesheet
pub fn not_found_message(project: &str) -> String {
    format!("No Tailwind stylesheet found for project \"{}\".", project)
}

/// Message when no web-like project has a stylesheet
pub const NO_APPS_MESSAGE: &str = "No Tailwind-enabled apps were found.";

/// Message after rewriting `count` stylesheets
pub fn updated_message(count: usize) -> String {
    format!("Tailwind @source directives updated for {} project(s).", count)
}

/// Message when check mode finds `count` stale stylesheets
pub fn stale_message(count: usize) -> String {
    format!("Tailwind @source directives are out of sync for {} project(s).", count)
}

/// Runs the synchronizer over `tree`
pub fn sync_stylesheets<T>(tree: &mut T, graph: &ProjectGraph, options: &SyncOptions) -> Result<SyncReport>
where
    T: Tree + ?Sized,
{
    let project = options.project.as_deref();
    let targets = discover_targets(
        &*tree,
        graph,
        project,
        options.styles_path.as_deref(),
        &options.web_targets,
    );

    let mut report = SyncReport {
        mode: options.mode,
        requested_project: options.project.clone(),
        projects: Vec::with_capacity(targets.len()),
        out_of_sync_message: None,
    };

    if targets.is_empty() {
        report.out_of_sync_message = Some(match project {
            Some(name) => not_found_message(name),
            None => NO_APPS_MESSAGE.to_string(),
        });
        return Ok(report);
    }

    for target in &targets {
        let deps = graph.transitive_dependencies(&target.name);
        let directives = build_directives(graph, &deps, &target.styles_path, &target.name);

        let css = tree
            .read(&target.styles_path)
            .with_context(|| format!("Failed to read stylesheet for {}", target.name))?
            .unwrap_or_default();

        let status = match stylesheet::patch(&css, &directives) {
            PatchOutcome::MissingMarker => ProjectStatus::Skipped,
            PatchOutcome::Unchanged => ProjectStatus::Unchanged,
            PatchOutcome::Updated(_) if options.mode == SyncMode::Check => ProjectStatus::Stale,
            PatchOutcome::Updated(next) => {
                tree.write(&target.styles_path, &next)
                    .with_context(|| format!("Failed to write stylesheet for {}", target.name))?;
                ProjectStatus::Updated
            }
        };

        report.projects.push(ProjectOutcome {
            project: target.name.clone(),
            stylesheet: target.styles_path.clone(),
            status,
            directives,
        });
    }

    let changed = report.changed_count();
    let stale = report.count(ProjectStatus::Stale);

    report.out_of_sync_message = if changed > 0 {
        Some(updated_message(changed))
    } else if stale > 0 {
        Some(stale_message(stale))
    } else {
        None
    };

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProjectNode;
    use crate::storage::MemoryTree;

    const STYLES: &str = "apps/app/src/styles.css";

    fn app() -> ProjectNode {
        ProjectNode::new("app", "apps/app")
            .with_source_root("apps/app/src")
            .with_target("build", Some("@nx/vite:build"))
    }

    /// app -> [libA, libB], libA -> [libC]
    fn scenario_graph() -> ProjectGraph {
        ProjectGraph::from_parts(
            [
                app(),
                ProjectNode::new("libA", "libs/lib-a"),
                ProjectNode::new("libB", "libs/lib-b"),
                ProjectNode::new("libC", "libs/lib-c"),
            ],
            [("app", "libA"), ("app", "libB"), ("libA", "libC")],
        )
        .unwrap()
    }

    const SYNCED: &str = "@import 'tailwindcss';\n\n@source '../../../libs/lib-a';\n@source '../../../libs/lib-b';\n@source '../../../libs/lib-c';\n";

    #[test]
    fn scenario_a_inserts_sorted_directives() {
        let graph = scenario_graph();
        let mut tree = MemoryTree::new().with_file(STYLES, "@import 'tailwindcss';\n");

        let report = sync_stylesheets(&mut tree, &graph, &SyncOptions::default()).unwrap();

        assert_eq!(tree.get(STYLES), Some(SYNCED));
        assert_eq!(report.changed_count(), 1);
        assert_eq!(report.out_of_sync_message, Some(updated_message(1)));
        assert_eq!(report.projects[0].status, ProjectStatus::Updated);
        assert_eq!(report.projects[0].directives.len(), 3);
    }

    #[test]
    fn scenario_b_in_sync_is_not_written() {
        let graph = scenario_graph();
        let mut tree = MemoryTree::new().with_file(STYLES, SYNCED);

        let report = sync_stylesheets(&mut tree, &graph, &SyncOptions::default()).unwrap();

        assert!(tree.writes().is_empty());
        assert_eq!(report.changed_count(), 0);
        assert_eq!(report.out_of_sync_message, None);
        assert_eq!(report.projects[0].status, ProjectStatus::Unchanged);
    }

    #[test]
    fn scenario_c_stale_block_replaced() {
        let graph = scenario_graph();
        let stale = "@import 'tailwindcss';\n\n@source '../../../libs/old-1';\n@source '../../../libs/old-2';\n@source '../../../libs/old-3';\n@source '../../../libs/old-4';\n\nbody { margin: 0; }\n";
        let mut tree = MemoryTree::new().with_file(STYLES, stale);

        let report = sync_stylesheets(&mut tree, &graph, &SyncOptions::default()).unwrap();

        let expected = "@import 'tailwindcss';\n\n@source '../../../libs/lib-a';\n@source '../../../libs/lib-b';\n@source '../../../libs/lib-c';\n\nbody { margin: 0; }\n";
        assert_eq!(tree.get(STYLES), Some(expected));
        assert_eq!(tree.writes().len(), 1);
        assert_eq!(report.changed_count(), 1);
    }

    #[test]
    fn scenario_d_unknown_project() {
        let graph = scenario_graph();
        let mut tree = MemoryTree::new().with_file(STYLES, "@import 'tailwindcss';\n");

        let options = SyncOptions {
            project: Some("nonexistent".to_string()),
            ..SyncOptions::default()
        };
        let report = sync_stylesheets(&mut tree, &graph, &options).unwrap();

        assert!(tree.writes().is_empty());
        assert!(report.projects.is_empty());
        let message = report.out_of_sync_message.unwrap();
        assert!(message.contains("\"nonexistent\""));
        assert_eq!(message, not_found_message("nonexistent"));
    }

    #[test]
    fn scenario_e_no_web_apps() {
        let graph = ProjectGraph::from_parts(
            [
                ProjectNode::new("libA", "libs/lib-a").with_target("lint", None),
                ProjectNode::new("libB", "libs/lib-b").with_target("test", None),
            ],
            [("libA", "libB")],
        )
        .unwrap();
        let mut tree = MemoryTree::new().with_file("libs/lib-a/src/styles.css", "@import 'tailwindcss';\n");

        let report = sync_stylesheets(&mut tree, &graph, &SyncOptions::default()).unwrap();

        assert!(tree.writes().is_empty());
        assert_eq!(report.out_of_sync_message.as_deref(), Some(NO_APPS_MESSAGE));
    }

    #[test]
    fn second_run_is_idempotent() {
        let graph = scenario_graph();
        let mut tree = MemoryTree::new().with_file(STYLES, "@import 'tailwindcss';\n\n.x {}\n");

        sync_stylesheets(&mut tree, &graph, &SyncOptions::default()).unwrap();
        let first = tree.get(STYLES).unwrap().to_string();
        tree.clear_writes();

        let report = sync_stylesheets(&mut tree, &graph, &SyncOptions::default()).unwrap();

        assert!(tree.writes().is_empty());
        assert_eq!(tree.get(STYLES), Some(first.as_str()));
        assert_eq!(report.out_of_sync_message, None);
    }

    #[test]
    fn missing_marker_is_never_modified() {
        let graph = scenario_graph();
        let css = "@import \"tailwindcss\";\n@source '../../../libs/stale';\n";
        let mut tree = MemoryTree::new().with_file(STYLES, css);

        let report = sync_stylesheets(&mut tree, &graph, &SyncOptions::default()).unwrap();

        assert!(tree.writes().is_empty());
        assert_eq!(tree.get(STYLES), Some(css));
        assert_eq!(report.projects[0].status, ProjectStatus::Skipped);
        assert_eq!(report.out_of_sync_message, None);
    }

    #[test]
    fn cycle_never_points_at_itself() {
        let graph = ProjectGraph::from_parts(
            [app(), ProjectNode::new("libA", "libs/lib-a")],
            [("app", "libA"), ("libA", "app")],
        )
        .unwrap();
        let mut tree = MemoryTree::new().with_file(STYLES, "@import 'tailwindcss';\n");

        let report = sync_stylesheets(&mut tree, &graph, &SyncOptions::default()).unwrap();

        assert_eq!(
            report.projects[0].directives,
            vec!["@source '../../../libs/lib-a';".to_string()]
        );
        assert!(!tree.get(STYLES).unwrap().contains("apps/app"));
    }

    #[test]
    fn check_mode_reports_without_writing() {
        let graph = scenario_graph();
        let mut tree = MemoryTree::new().with_file(STYLES, "@import 'tailwindcss';\n");

        let options = SyncOptions {
            mode: SyncMode::Check,
            ..SyncOptions::default()
        };
        let report = sync_stylesheets(&mut tree, &graph, &options).unwrap();

        assert!(tree.writes().is_empty());
        assert!(report.is_stale());
        assert_eq!(report.out_of_sync_message, Some(stale_message(1)));
    }

    #[test]
    fn multiple_apps_counted() {
        let graph = ProjectGraph::from_parts(
            [
                app(),
                ProjectNode::new("admin", "apps/admin").with_target("serve", None),
                ProjectNode::new("ui", "libs/ui"),
            ],
            [("app", "ui"), ("admin", "ui")],
        )
        .unwrap();
        let mut tree = MemoryTree::new()
            .with_file(STYLES, "@import 'tailwindcss';\n")
            .with_file("apps/admin/src/styles.css", "@import 'tailwindcss';\n");

        let report = sync_stylesheets(&mut tree, &graph, &SyncOptions::default()).unwrap();

        assert_eq!(report.changed_count(), 2);
        assert_eq!(report.out_of_sync_message, Some(updated_message(2)));
        assert_eq!(tree.writes(), ["apps/admin/src/styles.css".to_string(), STYLES.to_string()]);
    }

    #[test]
    fn report_serializes() {
        let graph = scenario_graph();
        let mut tree = MemoryTree::new().with_file(STYLES, SYNCED);

        let report = sync_stylesheets(&mut tree, &graph, &SyncOptions::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["mode"], "write");
        assert_eq!(json["projects"][0]["status"], "unchanged");
        assert_eq!(json["projects"][0]["stylesheet"], STYLES);
        assert!(json["out_of_sync_message"].is_null());
    }
}
