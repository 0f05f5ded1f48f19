//! Catalog SQL per warehouse dialect.
//!
//! Every identifier reaching these builders has already passed the
//! safe-identifier gate; the builders only assemble text.

use wq_core::DatasetRef;
use wq_db::CatalogDialect;

/// Builds the four metadata queries for one dataset.
#[derive(Debug, Clone, Copy)]
pub struct CatalogQueries {
    dialect: CatalogDialect,
}

impl CatalogQueries {
    pub fn new(dialect: CatalogDialect) -> Self {
        Self { dialect }
    }

    /// Tables and views, with type, creation time and DDL where available.
    pub fn tables(&self, dataset: &DatasetRef, tables: &[String]) -> String {
        match self.dialect {
            CatalogDialect::BigQuery => format!(
                "SELECT table_name, table_type, creation_time, ddl \
                 FROM {} \
                 {} \
                 ORDER BY table_name",
                bq_view(dataset, "INFORMATION_SCHEMA.TABLES"),
                where_clause(&[], "table_name", tables),
            ),
            CatalogDialect::DuckDb => format!(
                "SELECT table_name, table_type, NULL AS creation_time, NULL AS ddl \
                 FROM information_schema.tables \
                 {} \
                 ORDER BY table_name",
                where_clause(
                    &duckdb_scope(dataset, "table_catalog", "table_schema"),
                    "table_name",
                    tables
                ),
            ),
        }
    }

    /// Row counts per table.
    pub fn row_counts(&self, dataset: &DatasetRef, tables: &[String]) -> String {
        match self.dialect {
            CatalogDialect::BigQuery => format!(
                "SELECT table_id AS table_name, row_count \
                 FROM {} \
                 {}",
                bq_view(dataset, "__TABLES__"),
                where_clause(&[], "table_id", tables),
            ),
            CatalogDialect::DuckDb => format!(
                "SELECT table_name, estimated_size AS row_count \
                 FROM duckdb_tables() \
                 {}",
                where_clause(
                    &duckdb_scope(dataset, "database_name", "schema_name"),
                    "table_name",
                    tables
                ),
            ),
        }
    }

    /// Column listing in ordinal order.
    pub fn columns(&self, dataset: &DatasetRef, tables: &[String]) -> String {
        self.column_query(dataset, tables, None)
    }

    /// Primary-key columns.
    pub fn primary_keys(&self, dataset: &DatasetRef, tables: &[String]) -> String {
        match self.dialect {
            CatalogDialect::BigQuery => format!(
                "SELECT kcu.table_name, kcu.column_name \
                 FROM {} AS kcu \
                 JOIN {} AS tc \
                   ON kcu.constraint_name = tc.constraint_name \
                  AND kcu.table_name = tc.table_name \
                 {}",
                bq_view(dataset, "INFORMATION_SCHEMA.KEY_COLUMN_USAGE"),
                bq_view(dataset, "INFORMATION_SCHEMA.TABLE_CONSTRAINTS"),
                where_clause(
                    &["tc.constraint_type = 'PRIMARY KEY'".to_string()],
                    "kcu.table_name",
                    tables
                ),
            ),
            CatalogDialect::DuckDb => format!(
                "SELECT table_name, UNNEST(constraint_column_names) AS column_name \
                 FROM duckdb_constraints() \
                 {}",
                where_clause(
                    &[
                        duckdb_scope(dataset, "database_name", "schema_name"),
                        vec!["constraint_type = 'PRIMARY KEY'".to_string()],
                    ]
                    .concat(),
                    "table_name",
                    tables
                ),
            ),
        }
    }

    /// Identifier-like columns (`id`, `*_id`, or containing `id`).
    pub fn relationships(&self, dataset: &DatasetRef, tables: &[String]) -> String {
        self.column_query(
            dataset,
            tables,
            Some("LOWER(column_name) LIKE '%id%'"),
        )
    }

    fn column_query(
        &self,
        dataset: &DatasetRef,
        tables: &[String],
        extra: Option<&str>,
    ) -> String {
        let extra: Vec<String> = extra.map(str::to_string).into_iter().collect();
        match self.dialect {
            CatalogDialect::BigQuery => format!(
                "SELECT table_name, column_name, data_type, is_nullable, ordinal_position \
                 FROM {} \
                 {} \
                 ORDER BY table_name, ordinal_position",
                bq_view(dataset, "INFORMATION_SCHEMA.COLUMNS"),
                where_clause(&extra, "table_name", tables),
            ),
            CatalogDialect::DuckDb => format!(
                "SELECT table_name, column_name, data_type, is_nullable, ordinal_position \
                 FROM information_schema.columns \
                 {} \
                 ORDER BY table_name, ordinal_position",
                where_clause(
                    &[
                        duckdb_scope(dataset, "table_catalog", "table_schema"),
                        extra,
                    ]
                    .concat(),
                    "table_name",
                    tables
                ),
            ),
        }
    }
}

fn bq_view(dataset: &DatasetRef, view: &str) -> String {
    format!("`{}.{}`.{}", dataset.project_id, dataset.dataset_name, view)
}

fn duckdb_scope(dataset: &DatasetRef, catalog_col: &str, schema_col: &str) -> Vec<String> {
    vec![
        format!("{} = '{}'", catalog_col, dataset.project_id),
        format!("{} = '{}'", schema_col, dataset.dataset_name),
    ]
}

/// Join `conditions` plus an optional `IN` filter on `column` into a WHERE clause.
fn where_clause(conditions: &[String], column: &str, tables: &[String]) -> String {
    let mut all: Vec<String> = conditions.to_vec();
    if !tables.is_empty() {
        let quoted: Vec<String> = tables.iter().map(|t| format!("'{}'", t)).collect();
        all.push(format!("{} IN ({})", column, quoted.join(", ")));
    }
    if all.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", all.join(" AND "))
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
