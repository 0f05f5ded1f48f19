//! Schema introspection across projects and datasets.
//!
//! Targets are resolved and gate-checked up front; only then are metadata
//! queries issued. Each of the four queries per dataset is isolated, so a
//! failure is recorded on the document and the rest carry on.

use crate::catalog::CatalogQueries;
use crate::error::IntrospectResult;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use wq_core::identifier::{ensure_safe_identifier, ensure_safe_project, parse_project_dataset};
use wq_core::schema::{is_identifier_like, normalize_creation_time};
use wq_core::{
    ColumnInfo, CoreError, DatasetRef, DatasetSchema, DatasetTarget, IntrospectionStage,
    Relationship, RowCount, TableInfo, TableKey, UnifiedSchema,
};
use wq_db::Warehouse;

/// Introspection behaviour switches
#[derive(Debug, Clone, Copy, Default)]
pub struct IntrospectOptions {
    /// Report an unparsable `project.dataset` name as `MalformedReference`.
    ///
    /// Without it the name is logged and retried as a dataset of the default
    /// project, where the dot fails the identifier check (`UnsafeIdentifier`,
    /// or `MissingDefaultProject` when there is no default). The target is
    /// rejected in both modes; only the reported error differs.
    pub strict_dataset_references: bool,
}

/// A target with its owning project decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub dataset: DatasetRef,
    /// Requested tables; empty means the whole dataset
    pub tables: Vec<String>,
}

/// Decide which project owns `target`.
///
/// Priority: explicit project id, then a `project.dataset` name, then the
/// default project.
pub fn resolve_target(
    target: &DatasetTarget,
    default_project: Option<&str>,
    options: IntrospectOptions,
) -> IntrospectResult<ResolvedTarget> {
    let explicit = target.project_id.as_deref().filter(|p| !p.is_empty());

    let dataset = match explicit {
        Some(project) => DatasetRef::new(project, &target.name),
        None if target.name.contains('.') => match parse_project_dataset(&target.name) {
            Ok(parsed) => DatasetRef::new(parsed.project_id, parsed.dataset_name),
            Err(err) if options.strict_dataset_references => return Err(err.into()),
            Err(err) => {
                log::warn!(
                    "{}; treating '{}' as a dataset in the default project",
                    err,
                    target.name
                );
                DatasetRef::new(require_default(default_project, &target.name)?, &target.name)
            }
        },
        None => DatasetRef::new(require_default(default_project, &target.name)?, &target.name),
    };

    ensure_safe_project(&dataset.project_id)?;
    ensure_safe_identifier("dataset", &dataset.dataset_name)?;
    for table in &target.tables {
        ensure_safe_identifier("table", table)?;
    }

    Ok(ResolvedTarget {
        dataset,
        tables: target.tables.clone(),
    })
}

fn require_default<'a>(default_project: Option<&'a str>, dataset: &str) -> Result<&'a str, CoreError> {
    default_project
        .filter(|p| !p.is_empty())
        .ok_or_else(|| CoreError::MissingDefaultProject {
            dataset: dataset.to_string(),
        })
}

/// Reads warehouse metadata into a [`UnifiedSchema`]
pub struct Introspector {
    warehouse: Arc<dyn Warehouse>,
    queries: CatalogQueries,
    options: IntrospectOptions,
}

impl Introspector {
    pub fn new(warehouse: Arc<dyn Warehouse>) -> Self {
        let queries = CatalogQueries::new(warehouse.dialect());
        Self {
            warehouse,
            queries,
            options: IntrospectOptions::default(),
        }
    }

    pub fn with_options(mut self, options: IntrospectOptions) -> Self {
        self.options = options;
        self
    }

    /// Introspect every target and merge the results.
    ///
    /// Fails only when a target cannot be resolved or names an unsafe
    /// identifier. Metadata query failures end up on the document.
    pub async fn introspect(
        &self,
        default_project: Option<&str>,
        targets: &[DatasetTarget],
    ) -> IntrospectResult<UnifiedSchema> {
        let resolved = targets
            .iter()
            .map(|t| resolve_target(t, default_project, self.options))
            .collect::<IntrospectResult<Vec<_>>>()?;

        let mut parts = Vec::with_capacity(resolved.len());
        for target in &resolved {
            parts.push(self.introspect_dataset(target).await);
        }

        let schema = UnifiedSchema::merge(parts);
        log::info!(
            "Introspected {} datasets: {} tables, {} columns, {} issues",
            schema.summary.total_datasets,
            schema.summary.total_tables,
            schema.summary.total_columns,
            schema.issues.len()
        );
        Ok(schema)
    }

    async fn introspect_dataset(&self, target: &ResolvedTarget) -> DatasetSchema {
        let dataset = &target.dataset;
        log::info!("Introspecting {} on {}", dataset, self.warehouse.db_type());

        let mut schema = DatasetSchema::empty(dataset.clone());

        match self.run(&self.queries.tables(dataset, &target.tables)).await {
            Ok(rows) => schema.tables = rows.iter().filter_map(|r| parse_table(dataset, r)).collect(),
            Err(message) => self.record(&mut schema, IntrospectionStage::Tables, message),
        }

        let table_keys: Vec<TableKey> = if schema.tables.is_empty() {
            target.tables.iter().map(|t| dataset.table(t)).collect()
        } else {
            schema.tables.iter().map(|t| t.key.clone()).collect()
        };

        match self.run(&self.queries.row_counts(dataset, &target.tables)).await {
            Ok(rows) => {
                let counts: HashMap<String, i64> = rows
                    .iter()
                    .filter_map(|r| Some((text(r, "table_name")?, integer(r, "row_count")?)))
                    .collect();
                schema.row_counts = table_keys
                    .iter()
                    .map(|key| match counts.get(&key.table_name) {
                        Some(n) => RowCount::counted(key.clone(), *n),
                        None => RowCount::failed(key.clone(), "row count not reported"),
                    })
                    .collect();
            }
            Err(message) => {
                schema.row_counts = table_keys
                    .iter()
                    .map(|key| RowCount::failed(key.clone(), message.clone()))
                    .collect();
                self.record(&mut schema, IntrospectionStage::RowCounts, message);
            }
        }

        match self.run(&self.queries.columns(dataset, &target.tables)).await {
            Ok(rows) => {
                let mut columns: Vec<ColumnInfo> =
                    rows.iter().filter_map(|r| parse_column(dataset, r)).collect();
                columns.sort_by(|a, b| {
                    (&a.table.table_name, a.ordinal_position)
                        .cmp(&(&b.table.table_name, b.ordinal_position))
                });

                match self.run(&self.queries.primary_keys(dataset, &target.tables)).await {
                    Ok(pk_rows) => {
                        let keys: HashSet<(String, String)> = pk_rows
                            .iter()
                            .filter_map(|r| Some((text(r, "table_name")?, text(r, "column_name")?)))
                            .collect();
                        for column in &mut columns {
                            column.is_primary_key = keys.contains(&(
                                column.table.table_name.clone(),
                                column.column_name.clone(),
                            ));
                        }
                    }
                    Err(message) => {
                        self.record(&mut schema, IntrospectionStage::PrimaryKeys, message)
                    }
                }
                schema.columns = columns;
            }
            Err(message) => self.record(&mut schema, IntrospectionStage::Columns, message),
        }

        match self.run(&self.queries.relationships(dataset, &target.tables)).await {
            Ok(rows) => {
                schema.relationships = rows
                    .iter()
                    .filter_map(|r| parse_relationship(dataset, r))
                    .filter(|rel| is_identifier_like(&rel.column_name))
                    .collect();
            }
            Err(message) => self.record(&mut schema, IntrospectionStage::Relationships, message),
        }

        schema
    }

    /// Run one metadata query, flattening the error to its message
    async fn run(&self, sql: &str) -> Result<Vec<Value>, String> {
        self.warehouse.query(sql).await.map_err(|e| e.to_string())
    }

    fn record(&self, schema: &mut DatasetSchema, stage: IntrospectionStage, message: String) {
        log::warn!(
            "Introspection of {} failed at {}: {}",
            schema.dataset,
            stage,
            message
        );
        schema.record_issue(stage, message);
    }
}

fn parse_table(dataset: &DatasetRef, row: &Value) -> Option<TableInfo> {
    Some(TableInfo {
        key: dataset.table(text(row, "table_name")?),
        table_type: text(row, "table_type").unwrap_or_else(|| "BASE TABLE".to_string()),
        creation_time: normalize_creation_time(&row["creation_time"]),
        ddl: text(row, "ddl").filter(|d| !d.is_empty()),
    })
}

fn parse_column(dataset: &DatasetRef, row: &Value) -> Option<ColumnInfo> {
    Some(ColumnInfo {
        table: dataset.table(text(row, "table_name")?),
        column_name: text(row, "column_name")?,
        data_type: text(row, "data_type").unwrap_or_default(),
        is_nullable: nullable(row),
        ordinal_position: u32::try_from(integer(row, "ordinal_position")?).ok()?,
        is_primary_key: false,
    })
}

fn parse_relationship(dataset: &DatasetRef, row: &Value) -> Option<Relationship> {
    Some(Relationship {
        table: dataset.table(text(row, "table_name")?),
        column_name: text(row, "column_name")?,
        data_type: text(row, "data_type").unwrap_or_default(),
        is_nullable: nullable(row),
    })
}

fn text(row: &Value, key: &str) -> Option<String> {
    match &row[key] {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn integer(row: &Value, key: &str) -> Option<i64> {
    match &row[key] {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// `is_nullable` arrives as `YES`/`NO` text or a boolean; unknown means nullable
fn nullable(row: &Value) -> bool {
    match &row["is_nullable"] {
        Value::Bool(b) => *b,
        Value::String(s) => !s.eq_ignore_ascii_case("NO"),
        _ => true,
    }
}

#[cfg(test)]
#[path = "introspector_test.rs"]
mod tests;
