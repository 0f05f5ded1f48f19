//! Validation of warehouse identifiers
//!
//! Everything that gets interpolated into a metadata query passes through
//! here first. The checks are pure and never touch the warehouse.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Lower-case project id: 6 to 63 characters, starts with a letter.
fn project_id_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^[a-z][a-z0-9-]{5,62}$").expect("valid regex"))
}

fn safe_identifier_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^[A-Za-z0-9_]+$").expect("valid regex"))
}

/// A `project.dataset` reference split into its parts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectDataset {
    pub project_id: String,
    pub dataset_name: String,
}

impl std::fmt::Display for ProjectDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.project_id, self.dataset_name)
    }
}

/// Parse a `project.dataset` string.
///
/// The input must contain exactly one `.`, the dataset part must be
/// non-empty, and the project part must be a well-formed project id.
pub fn parse_project_dataset(input: &str) -> CoreResult<ProjectDataset> {
    let malformed = |reason: &str| CoreError::MalformedReference {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let mut parts = input.split('.');
    let (project, dataset) = match (parts.next(), parts.next(), parts.next()) {
        (Some(p), Some(d), None) => (p, d),
        _ => return Err(malformed("expected exactly one '.' separating project and dataset")),
    };

    if dataset.is_empty() {
        return Err(malformed("dataset name is empty"));
    }
    if !is_valid_project_id(project) {
        return Err(malformed(
            "project id must be 6-63 lower-case letters, digits or hyphens, start with a letter and not end with '-'",
        ));
    }

    Ok(ProjectDataset {
        project_id: project.to_string(),
        dataset_name: dataset.to_string(),
    })
}

/// Whether `project` is a well-formed project id.
pub fn is_valid_project_id(project: &str) -> bool {
    project_id_regex().is_match(project) && !project.ends_with('-')
}

/// Whether `name` consists only of ASCII letters, digits and underscores.
pub fn is_safe_identifier(name: &str) -> bool {
    safe_identifier_regex().is_match(name)
}

/// Reject `name` unless it is a safe identifier.
pub fn ensure_safe_identifier(kind: &'static str, name: &str) -> CoreResult<()> {
    if is_safe_identifier(name) {
        Ok(())
    } else {
        Err(CoreError::UnsafeIdentifier {
            kind,
            name: name.to_string(),
        })
    }
}

/// Reject a project reference that is neither a project id nor a safe identifier.
///
/// Local warehouses name their catalogs with plain identifiers, so both forms
/// are accepted for the project slot of a query.
pub fn ensure_safe_project(project: &str) -> CoreResult<()> {
    if is_valid_project_id(project) || is_safe_identifier(project) {
        Ok(())
    } else {
        Err(CoreError::UnsafeIdentifier {
            kind: "project",
            name: project.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "identifier_test.rs"]
mod tests;
