//! Dataset targets supplied by the user before introspection

use serde::{Deserialize, Serialize};

/// One dataset to introspect, optionally pinned to its owning project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetTarget {
    /// Dataset name, or a `project.dataset` reference
    pub name: String,

    /// Project that owns the dataset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Tables to introspect; empty means every table in the dataset
    #[serde(default)]
    pub tables: Vec<String>,
}

impl DatasetTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_id: None,
            tables: Vec::new(),
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = tables.into_iter().map(Into::into).collect();
        self
    }
}
