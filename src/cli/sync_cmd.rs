//! Sync, check and deps commands

use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Serialize;

use super::app::SyncArgs;
use super::output::Output;
use crate::domain::{build_directives, ProjectGraph};
use crate::storage::{Tree, Workspace};
use crate::sync::{
    context_project, resolve_project_name, stylesheet_candidate, sync_stylesheets, ProjectStatus,
    SyncMode, SyncOptions, SyncReport,
};

/// Loads a fresh graph snapshot through the workspace's provider
pub(super) fn load_graph(
    output: &Output,
    workspace: &Workspace,
    graph_override: Option<&Path>,
) -> Result<ProjectGraph> {
    let provider = workspace.graph_provider(graph_override);
    output.verbose_ctx("graph", &format!("Loading project graph from {}", provider.describe()));

    let graph = provider.load()?;
    output.verbose_ctx("graph", &format!("Loaded {} project(s)", graph.len()));

    Ok(graph)
}

/// Builds synchronizer options from flags, config, cwd and environment
pub(super) fn sync_options(
    output: &Output,
    workspace: &Workspace,
    graph: &ProjectGraph,
    args: &SyncArgs,
    mode: SyncMode,
) -> Result<SyncOptions> {
    let config = &workspace.config().project;

    let context = if config.infer_project_from_cwd {
        let cwd = std::env::current_dir()?.canonicalize()?;
        workspace
            .relative_path(&cwd)
            .and_then(|rel| context_project(graph, &rel))
    } else {
        None
    };

    let project = resolve_project_name(
        args.project.as_deref(),
        context.as_deref(),
        &config.project_env_vars,
        |var| std::env::var(var).ok(),
    );

    match &project {
        Some(name) => output.verbose_ctx("sync", &format!("Target project: {}", name)),
        None => output.verbose_ctx("sync", "Target project: all web apps"),
    }

    Ok(SyncOptions {
        project,
        styles_path: args
            .styles_path
            .clone()
            .or_else(|| config.styles_path.clone()),
        mode,
        web_targets: config.web_target_kinds(),
    })
}

pub fn run(
    output: &Output,
    workspace: &Workspace,
    graph_override: Option<&Path>,
    args: &SyncArgs,
    mode: SyncMode,
) -> Result<()> {
    let graph = load_graph(output, workspace, graph_override)?;
    let options = sync_options(output, workspace, &graph, args, mode)?;

    let mut tree = workspace.tree();
    let report = sync_stylesheets(&mut tree, &graph, &options)?;

    print_report(output, &report);

    if report.is_stale() {
        let message = report.out_of_sync_message.clone().unwrap_or_default();
        return Err(anyhow!(message));
    }

    Ok(())
}

/// Prints per-project results and the summary line
pub(super) fn print_report(output: &Output, report: &SyncReport) {
    for outcome in &report.projects {
        output.verbose_ctx(
            "sync",
            &format!(
                "{}: {:?} ({}, {} directive(s))",
                outcome.project,
                outcome.status,
                outcome.stylesheet,
                outcome.directives.len()
            ),
        );
    }

    if output.is_json() {
        output.data(report);
        return;
    }

    for outcome in &report.projects {
        match outcome.status {
            ProjectStatus::Updated => output.line(&format!("updated {}", outcome.stylesheet)),
            ProjectStatus::Stale => output.line(&format!("out of date {}", outcome.stylesheet)),
            ProjectStatus::Skipped => output.line(&format!(
                "skipped {} (no @import 'tailwindcss';)",
                outcome.stylesheet
            )),
            ProjectStatus::Unchanged => {}
        }
    }

    match (&report.out_of_sync_message, report.is_stale()) {
        // Check failures are reported through the returned error
        (_, true) => {}
        (Some(message), false) => output.success(message),
        (None, false) => output.success("Tailwind @source directives are in sync."),
    }
}

#[derive(Debug, Serialize)]
struct DependencyEntry {
    name: String,
    root: Option<String>,
}

#[derive(Debug, Serialize)]
struct DepsReport {
    project: String,
    root: String,
    web_like: bool,
    stylesheet: String,
    stylesheet_exists: bool,
    direct: Vec<String>,
    dependencies: Vec<DependencyEntry>,
    directives: Vec<String>,
}

pub fn deps(
    output: &Output,
    workspace: &Workspace,
    graph_override: Option<&Path>,
    project: &str,
    styles_path: Option<&str>,
) -> Result<()> {
    let graph = load_graph(output, workspace, graph_override)?;
    let config = &workspace.config().project;
    let node = graph.require(project)?;

    let styles_override = styles_path.or(config.styles_path.as_deref());
    let stylesheet = stylesheet_candidate(node, styles_override);
    let closure = graph.transitive_dependencies(project);

    let report = DepsReport {
        project: node.name.clone(),
        root: node.root.clone(),
        web_like: node.is_web_like(&config.web_target_kinds()),
        stylesheet_exists: workspace.tree().exists(&stylesheet),
        direct: graph.dependencies(project),
        dependencies: closure
            .iter()
            .filter(|name| name.as_str() != project)
            .map(|name| DependencyEntry {
                name: name.clone(),
                root: graph.project(name).map(|p| p.root.clone()),
            })
            .collect(),
        directives: build_directives(&graph, &closure, &stylesheet, project),
        stylesheet,
    };

    if output.is_json() {
        output.data(&report);
        return Ok(());
    }

    println!("{} ({})", report.project, report.root);
    println!(
        "  web app:    {}",
        if report.web_like { "yes" } else { "no" }
    );
    println!(
        "  stylesheet: {}{}",
        report.stylesheet,
        if report.stylesheet_exists { "" } else { " (missing)" }
    );
    println!();

    if report.dependencies.is_empty() {
        println!("No dependencies.");
    } else {
        println!("{:<30} ROOT", "DEPENDENCY");
        println!("{}", "-".repeat(60));
        for dep in &report.dependencies {
            println!(
                "{:<30} {}",
                dep.name,
                dep.root.as_deref().unwrap_or("(external)")
            );
        }
    }

    if !report.directives.is_empty() {
        println!();
        for line in &report.directives {
            println!("{}", line);
        }
    }

    Ok(())
}
