use super::*;

fn dataset() -> DatasetRef {
    DatasetRef::new("bigquery-public-data", "stackoverflow")
}

#[test]
fn test_bigquery_tables_query() {
    let sql = CatalogQueries::new(CatalogDialect::BigQuery).tables(&dataset(), &[]);
    assert!(sql.contains("FROM `bigquery-public-data.stackoverflow`.INFORMATION_SCHEMA.TABLES"));
    assert!(!sql.contains("WHERE"));
    assert!(sql.contains("ORDER BY table_name"));
}

#[test]
fn test_bigquery_table_filter() {
    let tables = vec!["users".to_string(), "posts_questions".to_string()];
    let sql = CatalogQueries::new(CatalogDialect::BigQuery).row_counts(&dataset(), &tables);
    assert!(sql.contains("`bigquery-public-data.stackoverflow`.__TABLES__"));
    assert!(sql.contains("WHERE table_id IN ('users', 'posts_questions')"));
}

#[test]
fn test_bigquery_primary_keys_query() {
    let sql = CatalogQueries::new(CatalogDialect::BigQuery).primary_keys(&dataset(), &[]);
    assert!(sql.contains("INFORMATION_SCHEMA.KEY_COLUMN_USAGE"));
    assert!(sql.contains("INFORMATION_SCHEMA.TABLE_CONSTRAINTS"));
    assert!(sql.contains("WHERE tc.constraint_type = 'PRIMARY KEY'"));
}

#[test]
fn test_relationships_filter_on_id_columns() {
    let tables = vec!["users".to_string()];
    let sql = CatalogQueries::new(CatalogDialect::BigQuery).relationships(&dataset(), &tables);
    assert!(sql.contains("WHERE LOWER(column_name) LIKE '%id%' AND table_name IN ('users')"));
}

#[test]
fn test_duckdb_queries_scope_catalog_and_schema() {
    let queries = CatalogQueries::new(CatalogDialect::DuckDb);
    let ds = DatasetRef::new("memory", "sales");

    let tables = queries.tables(&ds, &[]);
    assert!(tables.contains("FROM information_schema.tables"));
    assert!(tables.contains("WHERE table_catalog = 'memory' AND table_schema = 'sales'"));

    let counts = queries.row_counts(&ds, &["orders".to_string()]);
    assert!(counts.contains("duckdb_tables()"));
    assert!(counts.contains(
        "WHERE database_name = 'memory' AND schema_name = 'sales' AND table_name IN ('orders')"
    ));

    let pks = queries.primary_keys(&ds, &[]);
    assert!(pks.contains("duckdb_constraints()"));
    assert!(pks.contains("constraint_type = 'PRIMARY KEY'"));

    let columns = queries.columns(&ds, &[]);
    assert!(columns.contains("ORDER BY table_name, ordinal_position"));
}
