//! Keeps the tool-owned block at the head of the project's ignore file while
//! leaving everything the user wrote in place.

mod template;

use std::{collections::HashSet, path::Path};

use anyhow::Context;
use tracing::debug;

use crate::fs::{read_optional, write_atomic};

pub use template::{IgnoreSection, IgnoreTemplate, IGNORE_TEMPLATE_VERSION};

#[derive(Debug, thiserror::Error)]
#[error("failed to update {path}: {source:#}")]
pub struct IgnoreFileError {
    pub path: String,
    #[source]
    pub source: anyhow::Error,
}

impl IgnoreFileError {
    fn new(path: &Path, source: anyhow::Error) -> Self {
        Self {
            path: path.display().to_string(),
            source,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: bool,
    pub changed: bool,
}

/// Merges the template head (plus `dynamic`) with `existing`.
///
/// `known` lists every pattern the tool may have written on an earlier run,
/// whichever backend was active then; those lines are dropped from the user
/// region but only `dynamic` is rendered into the head.
///
/// Every template line and dynamic pattern appears exactly once, other lines
/// keep their relative order, blank runs collapse to one, and the result ends
/// with a single newline. Applying it to its own output is a no-op.
#[must_use]
pub fn reconcile_ignore_content(
    existing: Option<&str>,
    template: &IgnoreTemplate,
    dynamic: &[String],
    known: &[String],
) -> String {
    let head = template.render_lines(dynamic);
    let owned: HashSet<&str> = template
        .owned_lines()
        .chain(dynamic.iter().map(String::as_str))
        .chain(known.iter().map(String::as_str))
        .collect();

    let mut lines: Vec<&str> = head.iter().map(String::as_str).collect();
    // user content always starts after exactly one blank separator
    lines.push("");
    for line in existing.unwrap_or_default().lines() {
        if line.trim().is_empty() {
            if lines.last().is_some_and(|last| !last.is_empty()) {
                lines.push("");
            }
        } else if !owned.contains(line) {
            lines.push(line);
        }
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Rewrites the ignore file at `path` through [`reconcile_ignore_content`],
/// creating it when absent. The file is only replaced when its bytes change.
///
/// # Errors
///
/// Returns [`IgnoreFileError`] when the file cannot be read or replaced.
pub fn reconcile_ignore_file(
    path: &Path,
    template: &IgnoreTemplate,
    dynamic: &[String],
    known: &[String],
) -> Result<ReconcileReport, IgnoreFileError> {
    let existing = read_optional(path)
        .with_context(|| format!("failed to read {}", path.display()))
        .map_err(|err| IgnoreFileError::new(path, err))?;
    let merged = reconcile_ignore_content(existing.as_deref(), template, dynamic, known);
    let report = ReconcileReport {
        created: existing.is_none(),
        changed: existing.as_deref() != Some(merged.as_str()),
    };
    if report.changed {
        write_atomic(path, &merged).map_err(|err| IgnoreFileError::new(path, err))?;
        debug!(path = %path.display(), created = report.created, "ignore file reconciled");
    }
    Ok(report)
}

/// Drops exact matches of `patterns` from `contents`, collapsing the blank
/// runs left behind.
#[must_use]
pub fn remove_ignore_content(contents: &str, patterns: &[String]) -> String {
    let drop: HashSet<&str> = patterns.iter().map(String::as_str).collect();
    let mut lines: Vec<&str> = Vec::new();
    for line in contents.lines() {
        if line.trim().is_empty() {
            if lines.last().is_some_and(|last| !last.is_empty()) {
                lines.push("");
            }
        } else if !drop.contains(line) {
            lines.push(line);
        }
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Removes previously inserted patterns, e.g. on project teardown. The file
/// itself is never deleted; a missing file is left missing.
///
/// # Errors
///
/// Returns [`IgnoreFileError`] when the file cannot be read or replaced.
pub fn remove_ignore_patterns(path: &Path, patterns: &[String]) -> Result<bool, IgnoreFileError> {
    let Some(existing) = read_optional(path)
        .with_context(|| format!("failed to read {}", path.display()))
        .map_err(|err| IgnoreFileError::new(path, err))?
    else {
        return Ok(false);
    };
    let cleaned = remove_ignore_content(&existing, patterns);
    if cleaned == existing {
        return Ok(false);
    }
    write_atomic(path, &cleaned).map_err(|err| IgnoreFileError::new(path, err))?;
    debug!(path = %path.display(), removed = patterns.len(), "ignore patterns removed");
    Ok(true)
}
