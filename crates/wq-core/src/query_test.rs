use super::*;
use serde_json::json;

fn candidate(sql: &str, confidence: f64) -> SqlCandidate {
    SqlCandidate {
        sql: sql.to_string(),
        explanation: "counts rows".to_string(),
        confidence,
        assumptions: vec![],
        tables_used: vec!["proj-one.ds.t".to_string()],
    }
}

#[test]
fn test_candidate_validation() {
    assert!(candidate("SELECT 1", 0.9).validate().is_ok());
    assert!(candidate("SELECT 1", 0.0).validate().is_ok());
    assert!(candidate("SELECT 1", 1.0).validate().is_ok());
    assert!(candidate("   ", 0.5).validate().is_err());
    assert!(candidate("SELECT 1", 1.5).validate().is_err());
    assert!(candidate("SELECT 1", -0.1).validate().is_err());
    assert!(candidate("SELECT 1", f64::NAN).validate().is_err());
}

#[test]
fn test_candidate_defaults_missing_lists() {
    let parsed: SqlCandidate = serde_json::from_value(json!({
        "sql": "SELECT 1",
        "explanation": "one",
        "confidence": 0.8
    }))
    .unwrap();
    assert!(parsed.assumptions.is_empty());
    assert!(parsed.tables_used.is_empty());
}

#[test]
fn test_not_approved_outcome() {
    let outcome = ExecutionOutcome::not_approved("SELECT 1");
    assert!(!outcome.success);
    assert!(outcome.rows.is_none());
    assert_eq!(outcome.modifications.as_deref(), Some(NOTE_NOT_APPROVED));
}

#[test]
fn test_executed_outcome_serialized_shape() {
    let mut row = Row::new();
    row.insert("n".to_string(), json!(1));
    let outcome = ExecutionOutcome::executed("select 1", vec![row], true);

    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["finalSQL"], "select 1");
    assert_eq!(value["rowCount"], 1);
    assert_eq!(value["queryResult"][0]["n"], 1);
    assert_eq!(value["modifications"], NOTE_MODIFIED);
    assert!(value.get("error").is_none());
}

#[test]
fn test_failed_outcome_keeps_null_rows() {
    let outcome = ExecutionOutcome::execution_failed("SELECT x", "boom", false);
    let value = serde_json::to_value(&outcome).unwrap();
    assert!(value["queryResult"].is_null());
    assert_eq!(value["error"], "boom");
    assert!(value.get("modifications").is_none());
}
