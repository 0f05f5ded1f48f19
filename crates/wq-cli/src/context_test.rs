use super::*;
use std::fs;
use tempfile::TempDir;

fn global(dir: &TempDir) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        project_dir: dir.path().display().to_string(),
        config: None,
        database: None,
        default_project: None,
    }
}

#[test]
fn test_missing_config_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let ctx = RuntimeContext::load(&global(&dir)).unwrap();
    assert_eq!(ctx.config.warehouse.warehouse_type, WarehouseType::DuckDb);
    assert_eq!(ctx.run_store().dir(), dir.path().join(".wq/runs"));
}

#[test]
fn test_flags_override_config_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("wq.yml"),
        "default_project: from-config\nstrict_dataset_references: true\nwarehouse:\n  path: file.duckdb\n",
    )
    .unwrap();

    let mut args = global(&dir);
    args.database = Some(":memory:".to_string());
    args.default_project = Some("from-flag".to_string());
    let ctx = RuntimeContext::load(&args).unwrap();

    assert_eq!(ctx.config.warehouse.path, ":memory:");
    assert_eq!(ctx.config.default_project.as_deref(), Some("from-flag"));
    assert!(ctx.introspect_options().strict_dataset_references);
}

#[test]
fn test_invalid_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("wq.yml"), "unknown_key: 1\n").unwrap();
    assert!(RuntimeContext::load(&global(&dir)).is_err());
}

#[tokio::test]
async fn test_duckdb_warehouse_from_config() {
    let dir = TempDir::new().unwrap();
    let mut args = global(&dir);
    args.database = Some(":memory:".to_string());
    let ctx = RuntimeContext::load(&args).unwrap();

    let warehouse = ctx.warehouse().unwrap();
    assert_eq!(warehouse.db_type(), "duckdb");
    let rows = warehouse.query("SELECT 42 AS answer").await.unwrap();
    assert_eq!(rows[0]["answer"], 42);
}
