//! Introspection against a real in-memory DuckDB warehouse.

use std::sync::Arc;
use wq_core::presentation::render_markdown;
use wq_core::{DatasetTarget, TableKey};
use wq_db::DuckDbBackend;
use wq_introspect::Introspector;

fn seeded() -> Arc<DuckDbBackend> {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE SCHEMA sales;
         CREATE TABLE sales.customers (
             customer_id INTEGER PRIMARY KEY,
             name VARCHAR NOT NULL,
             region VARCHAR
         );
         CREATE TABLE sales.orders (
             order_id INTEGER PRIMARY KEY,
             customer_id INTEGER,
             amount DOUBLE
         );
         INSERT INTO sales.customers VALUES (1, 'ada', 'eu'), (2, 'bob', 'us');
         INSERT INTO sales.orders VALUES (10, 1, 9.5), (11, 1, 3.0), (12, 2, 7.25);
         CREATE VIEW sales.big_orders AS SELECT * FROM sales.orders WHERE amount > 5;
         CREATE SCHEMA hr;
         CREATE TABLE hr.staff (id INTEGER, title VARCHAR);",
    )
    .unwrap();
    Arc::new(db)
}

#[tokio::test]
async fn test_introspect_whole_dataset() {
    let schema = Introspector::new(seeded())
        .introspect(Some("memory"), &[DatasetTarget::new("sales")])
        .await
        .unwrap();

    let names: Vec<&str> = schema
        .tables
        .iter()
        .map(|t| t.key.table_name.as_str())
        .collect();
    assert_eq!(names, vec!["big_orders", "customers", "orders"]);
    assert_eq!(schema.tables[0].table_type, "VIEW");
    assert_eq!(schema.summary.total_tables, 3);
    assert_eq!(schema.summary.total_columns, schema.columns.len());
    assert_eq!(schema.summary.projects_accessed, vec!["memory".to_string()]);

    let customers = TableKey::new("memory", "sales", "customers");
    let columns = schema.columns_for(&customers);
    assert_eq!(columns.len(), 3);
    assert_eq!(columns[0].column_name, "customer_id");
    assert_eq!(columns[0].ordinal_position, 1);
    assert!(columns[0].is_primary_key);
    assert!(!columns[1].is_nullable);
    assert!(columns[2].is_nullable);

    assert_eq!(schema.row_count_for(&customers).unwrap().row_count, Some(2));
    let orders = TableKey::new("memory", "sales", "orders");
    assert_eq!(schema.row_count_for(&orders).unwrap().row_count, Some(3));
    let view = TableKey::new("memory", "sales", "big_orders");
    assert_eq!(schema.row_count_for(&view).unwrap().row_count, None);

    assert!(schema
        .relationships
        .iter()
        .any(|r| r.table == orders && r.column_name == "customer_id"));
    assert!(schema
        .relationships
        .iter()
        .all(|r| r.column_name.contains("id")));
}

#[tokio::test]
async fn test_introspect_selected_tables_across_datasets() {
    let schema = Introspector::new(seeded())
        .introspect(
            None,
            &[
                DatasetTarget::new("sales")
                    .with_project("memory")
                    .with_tables(["orders"]),
                DatasetTarget::new("hr").with_project("memory"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(schema.summary.total_datasets, 2);
    assert_eq!(schema.tables.len(), 2);
    assert_eq!(schema.tables[0].key.to_string(), "memory.sales.orders");
    assert_eq!(schema.tables[1].key.to_string(), "memory.hr.staff");
    assert!(schema.issues.is_empty(), "issues: {:?}", schema.issues);

    let text = render_markdown(&schema);
    assert!(text.contains("### `memory.sales.orders` (3 rows)"));
    assert!(text.contains("### `memory.hr.staff` (0 rows)"));
}
