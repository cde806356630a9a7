//! # Command-Line Interface
//!
//! User-facing commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `sync` | Rewrite stylesheets whose `@source` block is out of date |
//! | `check` | Same analysis, no writes; exits non-zero when stale |
//! | `deps <project>` | Show a project's closure and directive lines |
//! | `watch` | Sync, then re-sync on project graph changes |
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! tailwind-sync --verbose sync --project miniapp
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod sync_cmd;
mod watch;

pub use app::{run, Cli, Commands, SyncArgs};
pub use output::{Output, OutputFormat};
