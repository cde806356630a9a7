//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{sync_cmd, watch};
use crate::storage::{Config, Workspace};
use crate::sync::SyncMode;

#[derive(Parser)]
#[command(name = "tailwind-sync")]
#[command(author, version, about = "Keep Tailwind @source directives in sync with the project graph")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (defaults to searching upward from the current directory)
    #[arg(long, short = 'C', global = true)]
    pub workspace: Option<PathBuf>,

    /// Project graph JSON, as written by `nx graph --file`
    #[arg(long, global = true, env = "TAILWIND_SYNC_GRAPH")]
    pub graph: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by the commands that patch stylesheets
#[derive(Args, Debug, Clone, Default)]
pub struct SyncArgs {
    /// Limit to a single project by name
    #[arg(long, short)]
    pub project: Option<String>,

    /// Stylesheet path relative to the project root
    #[arg(long)]
    pub styles_path: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Update @source directives in every out-of-date stylesheet
    Sync(SyncArgs),

    /// Report stylesheets that are out of date without writing (exits 1 if any)
    Check(SyncArgs),

    /// Show a project's transitive dependencies and its @source lines
    Deps {
        /// Project name
        project: String,

        /// Stylesheet path relative to the project root
        #[arg(long)]
        styles_path: Option<String>,
    },

    /// Sync, then re-sync whenever the project graph changes
    Watch(SyncArgs),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("tailwind-sync starting");

    let workspace = open_workspace(cli.workspace)?;
    output.verbose_ctx(
        "workspace",
        &format!("Using workspace at: {}", workspace.root().display()),
    );

    let graph = match cli.graph {
        Some(path) if path.is_relative() => Some(std::env::current_dir()?.join(path)),
        other => other,
    };

    match cli.command {
        Commands::Sync(args) => {
            sync_cmd::run(&output, &workspace, graph.as_deref(), &args, SyncMode::Write)?
        }
        Commands::Check(args) => {
            sync_cmd::run(&output, &workspace, graph.as_deref(), &args, SyncMode::Check)?
        }
        Commands::Deps { project, styles_path } => sync_cmd::deps(
            &output,
            &workspace,
            graph.as_deref(),
            &project,
            styles_path.as_deref(),
        )?,
        Commands::Watch(args) => watch::run(&output, &workspace, graph.as_deref(), &args)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

fn open_workspace(path: Option<PathBuf>) -> Result<Workspace> {
    match path {
        Some(path) => {
            let root = std::env::current_dir()?.join(&path);
            Workspace::open(root)
                .with_context(|| format!("Failed to open workspace: {}", path.display()))
        }
        None => Workspace::open_current(),
    }
}
