//! tailwind-sync - keeps Tailwind `@source` directives in sync with a monorepo
//!
//! Each web app's stylesheet gets one `@source` line per project it depends
//! on, directly or transitively, so Tailwind scans every library whose class
//! names can end up in the app. Stylesheets are only rewritten when the set
//! of directives actually changes.

pub mod domain;
pub mod storage;
pub mod sync;
pub mod cli;

pub use domain::{ProjectGraph, ProjectNode, SourceDirective};
pub use sync::{sync_stylesheets, SyncOptions, SyncReport};
