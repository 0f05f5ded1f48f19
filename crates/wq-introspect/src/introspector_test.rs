use super::*;
use crate::error::IntrospectError;
use serde_json::json;
use wq_db::testing::ScriptedWarehouse;
use wq_db::CatalogDialect;

const STRICT: IntrospectOptions = IntrospectOptions {
    strict_dataset_references: true,
};

fn target(name: &str) -> DatasetTarget {
    DatasetTarget::new(name)
}

// ---- target resolution ----

#[test]
fn test_explicit_project_wins() {
    let t = target("sales").with_project("owner-project");
    let resolved = resolve_target(&t, Some("default-project"), IntrospectOptions::default()).unwrap();
    assert_eq!(resolved.dataset, DatasetRef::new("owner-project", "sales"));
}

#[test]
fn test_dotted_name_parsed() {
    let resolved = resolve_target(
        &target("bigquery-public-data.stackoverflow"),
        None,
        IntrospectOptions::default(),
    )
    .unwrap();
    assert_eq!(
        resolved.dataset,
        DatasetRef::new("bigquery-public-data", "stackoverflow")
    );
}

#[test]
fn test_default_project_used() {
    let t = target("sales").with_tables(["orders"]);
    let resolved = resolve_target(&t, Some("default-project"), IntrospectOptions::default()).unwrap();
    assert_eq!(resolved.dataset, DatasetRef::new("default-project", "sales"));
    assert_eq!(resolved.tables, vec!["orders".to_string()]);
}

#[test]
fn test_missing_default_project() {
    let err = resolve_target(&target("sales"), None, IntrospectOptions::default()).unwrap_err();
    assert!(matches!(
        err.core_error(),
        CoreError::MissingDefaultProject { dataset } if dataset == "sales"
    ));
}

#[test]
fn test_lenient_fallback_still_gated() {
    // Falls back to the default project, then the dotted name fails the gate.
    let err = resolve_target(
        &target("bad_id.ds"),
        Some("default-project"),
        IntrospectOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err.core_error(),
        CoreError::UnsafeIdentifier { kind: "dataset", .. }
    ));
}

#[test]
fn test_lenient_fallback_without_default() {
    let err = resolve_target(&target("bad_id.ds"), None, IntrospectOptions::default()).unwrap_err();
    assert!(matches!(
        err.core_error(),
        CoreError::MissingDefaultProject { .. }
    ));
}

#[test]
fn test_strict_mode_rejects_malformed_reference() {
    let err = resolve_target(&target("bad_id.ds"), Some("default-project"), STRICT).unwrap_err();
    assert!(matches!(
        err.core_error(),
        CoreError::MalformedReference { .. }
    ));
}

#[test]
fn test_malformed_dotted_names_rejected_in_both_modes() {
    for name in ["bad_id.ds", "a.b.c", ".ds", "proj."] {
        let lenient = resolve_target(&target(name), Some("default-project"), IntrospectOptions::default())
            .unwrap_err();
        assert!(
            matches!(lenient.core_error(), CoreError::UnsafeIdentifier { kind: "dataset", .. }),
            "{name}: {lenient}"
        );

        let strict = resolve_target(&target(name), Some("default-project"), STRICT).unwrap_err();
        assert!(
            matches!(strict.core_error(), CoreError::MalformedReference { .. }),
            "{name}: {strict}"
        );
    }
}

#[test]
fn test_unsafe_table_rejected() {
    let t = target("sales").with_tables(["orders; DROP TABLE x"]);
    let err = resolve_target(&t, Some("default-project"), IntrospectOptions::default()).unwrap_err();
    assert!(matches!(
        err.core_error(),
        CoreError::UnsafeIdentifier { kind: "table", .. }
    ));
}

// ---- introspection ----

fn healthy(warehouse: ScriptedWarehouse) -> ScriptedWarehouse {
    warehouse
        .on(
            "INFORMATION_SCHEMA.TABLES",
            vec![
                json!({"table_name": "posts", "table_type": "BASE TABLE", "creation_time": {"value": "2016-10-20T13:45:10Z"}, "ddl": null}),
                json!({"table_name": "users", "table_type": "BASE TABLE", "creation_time": "2016-10-20T13:45:11Z", "ddl": "CREATE TABLE users"}),
            ],
        )
        .on(
            "__TABLES__",
            vec![
                json!({"table_name": "posts", "row_count": "31017889"}),
                json!({"table_name": "users", "row_count": 18712212}),
            ],
        )
        .on(
            "KEY_COLUMN_USAGE",
            vec![json!({"table_name": "users", "column_name": "id"})],
        )
        .on(
            "LIKE '%id%'",
            vec![
                json!({"table_name": "posts", "column_name": "owner_user_id", "data_type": "INT64", "is_nullable": "YES"}),
                json!({"table_name": "users", "column_name": "id", "data_type": "INT64", "is_nullable": "NO"}),
            ],
        )
        .on(
            "INFORMATION_SCHEMA.COLUMNS",
            vec![
                json!({"table_name": "users", "column_name": "display_name", "data_type": "STRING", "is_nullable": "YES", "ordinal_position": 2}),
                json!({"table_name": "users", "column_name": "id", "data_type": "INT64", "is_nullable": "NO", "ordinal_position": 1}),
                json!({"table_name": "posts", "column_name": "id", "data_type": "INT64", "is_nullable": "NO", "ordinal_position": "1"}),
                json!({"table_name": "posts", "column_name": "owner_user_id", "data_type": "INT64", "is_nullable": "YES", "ordinal_position": 2}),
            ],
        )
}

#[tokio::test]
async fn test_introspect_builds_document() {
    let warehouse = Arc::new(healthy(ScriptedWarehouse::new(CatalogDialect::BigQuery)));
    let introspector = Introspector::new(warehouse.clone());

    let schema = introspector
        .introspect(None, &[target("bigquery-public-data.stackoverflow")])
        .await
        .unwrap();

    assert_eq!(warehouse.call_count(), 5);
    assert!(schema.issues.is_empty());
    assert_eq!(schema.summary.total_datasets, 1);
    assert_eq!(schema.summary.total_tables, 2);
    assert_eq!(schema.summary.total_columns, 4);
    assert_eq!(schema.summary.total_relationships, 2);
    assert_eq!(
        schema.summary.projects_accessed,
        vec!["bigquery-public-data".to_string()]
    );

    let posts = &schema.tables[0];
    assert_eq!(posts.key.to_string(), "bigquery-public-data.stackoverflow.posts");
    assert_eq!(posts.creation_time.as_deref(), Some("2016-10-20T13:45:10Z"));
    assert_eq!(schema.tables[1].ddl.as_deref(), Some("CREATE TABLE users"));

    let users = TableKey::new("bigquery-public-data", "stackoverflow", "users");
    let columns = schema.columns_for(&users);
    assert_eq!(columns[0].column_name, "id");
    assert!(columns[0].is_primary_key);
    assert!(!columns[0].is_nullable);
    assert!(!columns[1].is_primary_key);

    assert_eq!(schema.row_count_for(&users).unwrap().row_count, Some(18_712_212));
    let posts_key = TableKey::new("bigquery-public-data", "stackoverflow", "posts");
    assert_eq!(schema.row_count_for(&posts_key).unwrap().row_count, Some(31_017_889));
}

#[tokio::test]
async fn test_ordinal_positions_increase_from_one() {
    let warehouse = Arc::new(healthy(ScriptedWarehouse::new(CatalogDialect::BigQuery)));
    let schema = Introspector::new(warehouse)
        .introspect(Some("bigquery-public-data"), &[target("stackoverflow")])
        .await
        .unwrap();

    for table in &schema.tables {
        let positions: Vec<u32> = schema
            .columns_for(&table.key)
            .iter()
            .map(|c| c.ordinal_position)
            .collect();
        let expected: Vec<u32> = (1..=positions.len() as u32).collect();
        assert_eq!(positions, expected, "positions for {}", table.key);
    }
}

#[tokio::test]
async fn test_subquery_failures_are_isolated() {
    let warehouse = ScriptedWarehouse::new(CatalogDialect::BigQuery)
        .fail_on("__TABLES__", "Access Denied: __TABLES__")
        .fail_on("KEY_COLUMN_USAGE", "Not found: KEY_COLUMN_USAGE")
        .fail_on("LIKE '%id%'", "quota exceeded");
    let warehouse = Arc::new(healthy(warehouse));

    let schema = Introspector::new(warehouse.clone())
        .introspect(None, &[target("bigquery-public-data.stackoverflow")])
        .await
        .unwrap();

    assert_eq!(warehouse.call_count(), 5);
    assert_eq!(schema.summary.total_tables, schema.tables.len());
    assert_eq!(schema.summary.total_tables, 2);
    assert_eq!(schema.summary.total_columns, schema.columns.len());
    assert_eq!(schema.summary.total_columns, 4);
    assert_eq!(schema.summary.total_relationships, 0);

    assert_eq!(schema.row_counts.len(), 2);
    for rc in &schema.row_counts {
        assert_eq!(rc.row_count, None);
        assert!(rc.error.as_deref().unwrap().contains("Access Denied"));
    }
    assert!(schema.columns.iter().all(|c| !c.is_primary_key));

    let stages: Vec<IntrospectionStage> = schema.issues.iter().map(|i| i.stage).collect();
    assert_eq!(
        stages,
        vec![
            IntrospectionStage::RowCounts,
            IntrospectionStage::PrimaryKeys,
            IntrospectionStage::Relationships
        ]
    );
}

#[tokio::test]
async fn test_failing_dataset_does_not_abort_later_targets() {
    let warehouse = ScriptedWarehouse::new(CatalogDialect::BigQuery)
        .fail_on("`proj-broken.ds`", "Dataset proj-broken:ds was not found");
    let warehouse = Arc::new(healthy(warehouse));

    let schema = Introspector::new(warehouse.clone())
        .introspect(
            None,
            &[
                target("ds").with_project("proj-broken"),
                target("stackoverflow").with_project("bigquery-public-data"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(warehouse.call_count(), 9);
    assert_eq!(schema.summary.total_datasets, 2);
    assert_eq!(
        schema.summary.projects_accessed,
        vec!["bigquery-public-data".to_string(), "proj-broken".to_string()]
    );
    assert_eq!(schema.tables.len(), 2);
    assert!(schema
        .tables
        .iter()
        .all(|t| t.key.project_id == "bigquery-public-data"));
    assert_eq!(schema.issues.len(), 4);
    assert!(schema
        .issues
        .iter()
        .all(|i| i.dataset.project_id == "proj-broken"));
}

#[tokio::test]
async fn test_invalid_target_issues_no_queries() {
    let warehouse = Arc::new(healthy(ScriptedWarehouse::new(CatalogDialect::BigQuery)));
    let err = Introspector::new(warehouse.clone())
        .introspect(
            None,
            &[
                target("bigquery-public-data.stackoverflow"),
                target("orphan"),
            ],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, IntrospectError::InvalidTarget(_)));
    assert_eq!(warehouse.call_count(), 0);
}

#[tokio::test]
async fn test_explicit_tables_filter_queries_and_seed_row_counts() {
    let warehouse = ScriptedWarehouse::new(CatalogDialect::BigQuery)
        .fail_on("INFORMATION_SCHEMA.TABLES", "listing denied")
        .on(
            "__TABLES__",
            vec![json!({"table_name": "users", "row_count": 5})],
        );
    let warehouse = Arc::new(warehouse);

    let schema = Introspector::new(warehouse.clone())
        .introspect(
            None,
            &[target("bigquery-public-data.stackoverflow").with_tables(["users", "badges"])],
        )
        .await
        .unwrap();

    assert!(warehouse
        .calls()
        .iter()
        .all(|sql| sql.contains("IN ('users', 'badges')")));
    assert!(schema.tables.is_empty());
    assert_eq!(schema.row_counts.len(), 2);
    assert_eq!(schema.row_counts[0].row_count, Some(5));
    assert_eq!(schema.row_counts[1].row_count, None);
    assert_eq!(schema.issues[0].stage, IntrospectionStage::Tables);
}

#[tokio::test]
async fn test_empty_target_list() {
    let warehouse = Arc::new(ScriptedWarehouse::new(CatalogDialect::BigQuery));
    let schema = Introspector::new(warehouse.clone())
        .introspect(Some("default-project"), &[])
        .await
        .unwrap();
    assert_eq!(schema.summary, Default::default());
    assert_eq!(warehouse.call_count(), 0);
}
