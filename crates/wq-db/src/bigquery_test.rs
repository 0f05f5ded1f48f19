use super::*;
use std::collections::HashMap;

fn fields(value: Value) -> Vec<FieldSchema> {
    serde_json::from_value::<TableSchema>(value).unwrap().fields
}

#[test]
fn test_decode_scalar_types() {
    let schema = fields(json!({"fields": [
        {"name": "id", "type": "INTEGER", "mode": "NULLABLE"},
        {"name": "title", "type": "STRING"},
        {"name": "score", "type": "FLOAT"},
        {"name": "answered", "type": "BOOLEAN"},
        {"name": "created", "type": "TIMESTAMP"},
        {"name": "missing", "type": "STRING"}
    ]}));
    let rows = vec![json!({"f": [
        {"v": "42"},
        {"v": "hello"},
        {"v": "1.5"},
        {"v": "true"},
        {"v": "1.7040672E9"},
        {"v": null}
    ]})];

    let decoded = decode_rows(&schema, rows).unwrap();
    assert_eq!(decoded.len(), 1);
    let row = &decoded[0];
    assert_eq!(row["id"], json!(42));
    assert_eq!(row["title"], json!("hello"));
    assert_eq!(row["score"], json!(1.5));
    assert_eq!(row["answered"], json!(true));
    assert_eq!(row["created"], json!("2024-01-01T00:00:00+00:00"));
    assert_eq!(row["missing"], Value::Null);
}

#[test]
fn test_decode_repeated_and_record() {
    let schema = fields(json!({"fields": [
        {"name": "tags", "type": "STRING", "mode": "REPEATED"},
        {"name": "owner", "type": "RECORD", "fields": [
            {"name": "user_id", "type": "INT64"},
            {"name": "name", "type": "STRING"}
        ]}
    ]}));
    let rows = vec![json!({"f": [
        {"v": [{"v": "rust"}, {"v": "sql"}]},
        {"v": {"f": [{"v": "7"}, {"v": "ada"}]}}
    ]})];

    let decoded = decode_rows(&schema, rows).unwrap();
    assert_eq!(decoded[0]["tags"], json!(["rust", "sql"]));
    assert_eq!(decoded[0]["owner"], json!({"user_id": 7, "name": "ada"}));
}

#[test]
fn test_decode_rejects_cell_count_mismatch() {
    let schema = fields(json!({"fields": [{"name": "a", "type": "STRING"}]}));
    let err = decode_rows(&schema, vec![json!({"f": []})]).unwrap_err();
    assert!(matches!(err, DbError::Decode(_)));

    let err = decode_rows(&schema, vec![json!({"x": 1})]).unwrap_err();
    assert!(matches!(err, DbError::Decode(_)));
}

#[test]
fn test_response_errors_surface() {
    let response: QueryResponse = serde_json::from_value(json!({
        "jobComplete": true,
        "errors": [{"message": "Syntax error"}, {"message": "at [1:8]"}]
    }))
    .unwrap();
    let err = response.raise_errors().unwrap_err();
    assert_eq!(err.to_string(), "[D002] SQL execution failed: Syntax error; at [1:8]");
}

#[test]
fn test_response_warnings_do_not_fail_a_result() {
    let response: QueryResponse = serde_json::from_value(json!({
        "jobComplete": true,
        "schema": {"fields": [{"name": "n", "type": "INTEGER"}]},
        "rows": [{"f": [{"v": "7"}]}],
        "errors": [{"message": "Query exceeded the recommended slot usage"}]
    }))
    .unwrap();
    response.raise_errors().unwrap();

    let fields = response.schema.as_ref().unwrap().fields.clone();
    let rows = decode_rows(&fields, response.rows.clone().unwrap()).unwrap();
    assert_eq!(rows, vec![json!({"n": 7})]);
}

#[test]
fn test_job_error_result_fails_even_with_schema() {
    let response: QueryResponse = serde_json::from_value(json!({
        "jobComplete": true,
        "schema": {"fields": [{"name": "n", "type": "INTEGER"}]},
        "status": {"errorResult": {"message": "Resources exceeded"}},
        "errors": [{"message": "at [3:1]"}]
    }))
    .unwrap();
    let err = response.raise_errors().unwrap_err();
    assert_eq!(
        err.to_string(),
        "[D002] SQL execution failed: Resources exceeded; at [3:1]"
    );
}

#[test]
fn test_from_env_requires_token() {
    let env: HashMap<&str, &str> = HashMap::from([("BIGQUERY_PROJECT_ID", "my-project")]);
    let lookup = |name: &str| env.get(name).map(|v| v.to_string());

    let err = BigQueryBackend::from_env(None, &WarehouseConfig::default(), lookup).unwrap_err();
    assert!(err.to_string().contains("BIGQUERY_ACCESS_TOKEN"));
}

#[test]
fn test_from_env_builds_client() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("BIGQUERY_PROJECT_ID", "my-project"),
        ("BIGQUERY_ACCESS_TOKEN", "token"),
    ]);
    let lookup = |name: &str| env.get(name).map(|v| v.to_string());

    let backend = BigQueryBackend::from_env(None, &WarehouseConfig::default(), lookup)
        .unwrap()
        .with_endpoint("http://localhost:9050/bigquery/v2/");
    assert_eq!(backend.billing_project, "my-project");
    assert_eq!(backend.endpoint, "http://localhost:9050/bigquery/v2");
    assert_eq!(backend.db_type(), "bigquery");
    assert_eq!(backend.dialect(), CatalogDialect::BigQuery);
}
