//! Unified schema document produced by introspection
//!
//! One document covers every introspected dataset across every owning
//! project. Field names follow the warehouse catalog (`project_id`,
//! `table_name`, ...) so the document can be handed to prompts and
//! persisted without translation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fully-qualified table identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableKey {
    pub project_id: String,
    pub dataset_name: String,
    pub table_name: String,
}

impl TableKey {
    pub fn new(
        project_id: impl Into<String>,
        dataset_name: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_name: dataset_name.into(),
            table_name: table_name.into(),
        }
    }
}

impl std::fmt::Display for TableKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.project_id, self.dataset_name, self.table_name)
    }
}

/// A resolved (project, dataset) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatasetRef {
    pub project_id: String,
    pub dataset_name: String,
}

impl DatasetRef {
    pub fn new(project_id: impl Into<String>, dataset_name: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_name: dataset_name.into(),
        }
    }

    /// Key of a table inside this dataset
    pub fn table(&self, table_name: impl Into<String>) -> TableKey {
        TableKey::new(&self.project_id, &self.dataset_name, table_name)
    }
}

impl std::fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.project_id, self.dataset_name)
    }
}

/// A table or view found in a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    #[serde(flatten)]
    pub key: TableKey,

    /// Catalog table type, e.g. `BASE TABLE` or `VIEW`
    pub table_type: String,

    /// Creation time rendered as text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ddl: Option<String>,
}

/// A column of an introspected table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    #[serde(flatten)]
    pub table: TableKey,
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: bool,
    /// 1-based position within the table
    pub ordinal_position: u32,
    #[serde(default)]
    pub is_primary_key: bool,
}

/// An identifier-like column that may join to another table.
///
/// Found by name only (`id`, `*_id`, or containing `id`); never a declared
/// foreign key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(flatten)]
    pub table: TableKey,
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: bool,
}

/// Row count of one table; `row_count` is `None` when counting failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowCount {
    #[serde(flatten)]
    pub table: TableKey,
    pub row_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RowCount {
    pub fn counted(table: TableKey, row_count: i64) -> Self {
        Self {
            table,
            row_count: Some(row_count),
            error: None,
        }
    }

    pub fn failed(table: TableKey, error: impl Into<String>) -> Self {
        Self {
            table,
            row_count: None,
            error: Some(error.into()),
        }
    }
}

/// Which metadata query an introspection issue came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntrospectionStage {
    Tables,
    RowCounts,
    Columns,
    PrimaryKeys,
    Relationships,
}

impl std::fmt::Display for IntrospectionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntrospectionStage::Tables => write!(f, "tables"),
            IntrospectionStage::RowCounts => write!(f, "row_counts"),
            IntrospectionStage::Columns => write!(f, "columns"),
            IntrospectionStage::PrimaryKeys => write!(f, "primary_keys"),
            IntrospectionStage::Relationships => write!(f, "relationships"),
        }
    }
}

/// A non-fatal failure recorded while introspecting one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntrospectionIssue {
    #[serde(flatten)]
    pub dataset: DatasetRef,
    pub stage: IntrospectionStage,
    pub message: String,
}

/// Derived counts over a unified schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSummary {
    pub total_datasets: usize,
    pub total_tables: usize,
    pub total_columns: usize,
    pub total_relationships: usize,
    /// Sorted, de-duplicated
    pub projects_accessed: Vec<String>,
}

/// Introspection result for a single resolved dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub dataset: DatasetRef,
    pub tables: Vec<TableInfo>,
    pub columns: Vec<ColumnInfo>,
    pub relationships: Vec<Relationship>,
    pub row_counts: Vec<RowCount>,
    pub issues: Vec<IntrospectionIssue>,
}

impl DatasetSchema {
    pub fn empty(dataset: DatasetRef) -> Self {
        Self {
            dataset,
            tables: Vec::new(),
            columns: Vec::new(),
            relationships: Vec::new(),
            row_counts: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Record a failed sub-query against this dataset
    pub fn record_issue(&mut self, stage: IntrospectionStage, message: impl Into<String>) {
        self.issues.push(IntrospectionIssue {
            dataset: self.dataset.clone(),
            stage,
            message: message.into(),
        });
    }
}

/// Merged schema across every introspected dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedSchema {
    pub datasets: Vec<DatasetRef>,
    pub tables: Vec<TableInfo>,
    pub columns: Vec<ColumnInfo>,
    pub relationships: Vec<Relationship>,
    #[serde(rename = "rowCounts")]
    pub row_counts: Vec<RowCount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<IntrospectionIssue>,
    pub summary: SchemaSummary,
}

impl UnifiedSchema {
    /// Concatenate per-dataset results in order and recompute the summary.
    ///
    /// Parts are not de-duplicated against each other.
    pub fn merge(parts: impl IntoIterator<Item = DatasetSchema>) -> Self {
        let mut schema = UnifiedSchema::default();
        for part in parts {
            schema.datasets.push(part.dataset);
            schema.tables.extend(part.tables);
            schema.columns.extend(part.columns);
            schema.relationships.extend(part.relationships);
            schema.row_counts.extend(part.row_counts);
            schema.issues.extend(part.issues);
        }
        schema.refresh_summary();
        schema
    }

    /// Recompute `summary` from the current contents
    pub fn refresh_summary(&mut self) {
        let projects: BTreeSet<&str> = self
            .datasets
            .iter()
            .map(|d| d.project_id.as_str())
            .collect();

        self.summary = SchemaSummary {
            total_datasets: self.datasets.len(),
            total_tables: self.tables.len(),
            total_columns: self.columns.len(),
            total_relationships: self.relationships.len(),
            projects_accessed: projects.into_iter().map(String::from).collect(),
        };
    }

    /// Columns of `table`, sorted by ordinal position
    pub fn columns_for(&self, table: &TableKey) -> Vec<&ColumnInfo> {
        let mut columns: Vec<&ColumnInfo> =
            self.columns.iter().filter(|c| &c.table == table).collect();
        columns.sort_by_key(|c| c.ordinal_position);
        columns
    }

    pub fn row_count_for(&self, table: &TableKey) -> Option<&RowCount> {
        self.row_counts.iter().find(|rc| &rc.table == table)
    }

    /// Relationships grouped by table, in first-seen order
    pub fn relationships_by_table(&self) -> Vec<(&TableKey, Vec<&Relationship>)> {
        let mut groups: Vec<(&TableKey, Vec<&Relationship>)> = Vec::new();
        for rel in &self.relationships {
            match groups.iter_mut().find(|(key, _)| *key == &rel.table) {
                Some((_, rels)) => rels.push(rel),
                None => groups.push((&rel.table, vec![rel])),
            }
        }
        groups
    }
}

/// Whether a column name looks like an identifier (`id`, `*_id`, or containing `id`)
pub fn is_identifier_like(column_name: &str) -> bool {
    let lower = column_name.to_ascii_lowercase();
    lower == "id" || lower.ends_with("_id") || lower.contains("id")
}

/// Render a catalog creation time as text.
///
/// Backends return it as a plain string, a number, or wrapped in a
/// `{"value": ...}` object. Null and empty values yield `None`.
pub fn normalize_creation_time(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("value").and_then(normalize_creation_time),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
