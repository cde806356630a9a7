//! Domain models for tailwind-sync
//!
//! Contains the core logic without any I/O concerns: the project graph,
//! directive construction and stylesheet patching.

mod project;
mod graph;
mod directive;
pub mod stylesheet;

pub use project::{ProjectNode, Target, WebTargetKinds, DEFAULT_WEB_TARGETS};
pub use graph::{GraphError, ProjectGraph};
pub use directive::{build_directives, SourceDirective};
pub use stylesheet::{PatchOutcome, TAILWIND_IMPORT};
