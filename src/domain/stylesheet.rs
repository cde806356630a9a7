//! Idempotent patching of a stylesheet's `@source` block
//!
//! The stylesheet is treated as lines: a line is either a directive or
//! untouched content. No CSS parsing happens beyond that.

use std::collections::BTreeSet;

use super::directive::SourceDirective;

/// The import line that marks a stylesheet as Tailwind-managed
pub const TAILWIND_IMPORT: &str = "@import 'tailwindcss';";

/// Result of patching one stylesheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// No marker import; the file is left alone
    MissingMarker,
    /// Existing directives already match
    Unchanged,
    /// New file contents
    Updated(String),
}

/// Returns true if the stylesheet contains the Tailwind import
pub fn has_tailwind_import(css: &str) -> bool {
    css.contains(TAILWIND_IMPORT)
}

/// Collects the trimmed directive lines already present
pub fn existing_directives(css: &str) -> BTreeSet<String> {
    css.lines()
        .filter(|line| SourceDirective::is_directive_line(line))
        .map(|line| line.trim().to_string())
        .collect()
}

/// Returns true if the existing set differs from the desired lines
pub fn needs_update(existing: &BTreeSet<String>, desired: &[String]) -> bool {
    if existing.len() != desired.len() {
        return true;
    }
    desired.iter().any(|line| !existing.contains(line))
}

/// Line ending used by the stylesheet: CRLF if any line has one
fn line_ending(css: &str) -> &'static str {
    if css.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

fn is_blank(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']).is_empty()
}

/// Drops every directive line, then collapses blank-line runs to one
pub fn remove_directives(css: &str) -> String {
    let kept: String = css
        .split_inclusive('\n')
        .filter(|line| !SourceDirective::is_directive_line(line))
        .collect();

    collapse_blank_runs(&kept)
}

/// Keeps at most one blank line in a row; `\r\n` counts as one break
fn collapse_blank_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_blank = false;

    for line in text.split_inclusive('\n') {
        let blank = is_blank(line);
        if !(blank && previous_blank) {
            out.push_str(line);
        }
        previous_blank = blank;
    }

    out
}

/// Inserts the directive block right after the marker line
///
/// The block uses the stylesheet's own line ending. With no directives, or
/// no marker, the text is returned as is.
pub fn insert_after_import(css: &str, directives: &[String]) -> String {
    if directives.is_empty() {
        return css.to_string();
    }

    let import_idx = match css.find(TAILWIND_IMPORT) {
        Some(idx) => idx,
        None => return css.to_string(),
    };

    let insert_pos = css[import_idx..]
        .find('\n')
        .map(|offset| import_idx + offset + 1)
        .unwrap_or(css.len());

    let eol = line_ending(css);
    let (before, after) = css.split_at(insert_pos);
    format!("{}{}{}{}{}", before, eol, directives.join(eol), eol, after)
}

/// Brings the stylesheet's directive block in line with `desired`
///
/// `desired` is expected sorted and deduplicated.
pub fn patch(css: &str, desired: &[String]) -> PatchOutcome {
    if !has_tailwind_import(css) {
        return PatchOutcome::MissingMarker;
    }

    let existing = existing_directives(css);
    if !needs_update(&existing, desired) {
        return PatchOutcome::Unchanged;
    }

    let cleaned = remove_directives(css);
    PatchOutcome::Updated(insert_after_import(&cleaned, desired))
}
