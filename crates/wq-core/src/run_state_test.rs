use super::*;
use serde_json::json;
use tempfile::tempdir;

fn suspend(step: &str) -> SuspendPayload {
    SuspendPayload {
        step_id: StepId::new(step),
        message: "need input".to_string(),
        schema_snapshot: None,
    }
}

#[test]
fn test_run_new() {
    let run = Run::new(RunId::new("run-1"));
    assert_eq!(run.status, RunStatus::Running);
    assert_eq!(run.next_step_index(), 0);
    assert!(run.pending.is_none());
    assert!(run.last_output().is_none());
}

#[test]
fn test_generated_ids_are_unique() {
    assert_ne!(RunId::generate(), RunId::generate());
}

#[test]
fn test_empty_ids_rejected() {
    assert!(RunId::try_new("").is_none());
    assert!(serde_json::from_value::<StepId>(json!("")).is_err());
    assert_eq!("".parse::<RunId>().unwrap_err(), "RunId must not be empty");
    assert_eq!("run-7".parse::<RunId>().unwrap(), "run-7");
}

#[test]
fn test_record_step_grows_state() {
    let mut run = Run::new(RunId::new("run-1"));
    run.mark_suspended(suspend("collect"));
    assert_eq!(run.status, RunStatus::Suspended);

    run.record_step(StepId::new("collect"), json!({"datasets": []}));
    run.record_step(StepId::new("introspect"), json!({"schema": {}}));

    assert_eq!(run.status, RunStatus::Running);
    assert!(run.pending.is_none());
    assert_eq!(run.next_step_index(), 2);
    assert_eq!(run.output_of("collect"), Some(&json!({"datasets": []})));
    assert_eq!(run.last_output(), Some(&json!({"schema": {}})));
}

#[test]
fn test_suspended_result_reports_pending_step() {
    let mut run = Run::new(RunId::new("run-1"));
    run.mark_suspended(suspend("collect"));

    let result = run.to_result();
    assert_eq!(result.status, RunStatus::Suspended);
    assert_eq!(result.current_step_id, Some(StepId::new("collect")));
    assert!(result.suspend_payload.is_some());
    assert!(result.final_output.is_none());
}

#[test]
fn test_failed_result_carries_error() {
    let mut run = Run::new(RunId::new("run-1"));
    run.mark_suspended(suspend("generate"));
    run.mark_failed(RunFailure {
        step_id: Some(StepId::new("generate")),
        kind: "GenerationFailure".to_string(),
        message: "model unavailable".to_string(),
    });

    assert!(run.status.is_terminal());
    assert!(run.pending.is_none());
    let result = run.to_result();
    assert_eq!(result.current_step_id, Some(StepId::new("generate")));
    let error = result.error.unwrap();
    assert_eq!(
        error.to_string(),
        "GenerationFailure in step 'generate': model unavailable"
    );
}

#[test]
fn test_succeeded_result_has_final_output() {
    let mut run = Run::new(RunId::new("run-1"));
    run.record_step(StepId::new("only"), json!({"success": true}));
    run.mark_succeeded();

    let result = run.to_result();
    assert_eq!(result.final_output, Some(json!({"success": true})));
    assert_eq!(result.current_step_id, Some(StepId::new("only")));
}

#[test]
fn test_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("runs").join("run-1.json");

    let mut run = Run::new(RunId::new("run-1"));
    run.record_step(StepId::new("collect"), json!({"datasets": [{"name": "ds"}]}));
    run.mark_suspended(SuspendPayload {
        step_id: StepId::new("generate"),
        message: "ask".to_string(),
        schema_snapshot: Some(json!({"schemaPresentation": "# Schema"})),
    });

    run.save(&path).unwrap();
    assert!(!path.with_extension("json.tmp").exists());

    let loaded = Run::load(&path).unwrap().unwrap();
    assert_eq!(loaded, run);
}

#[test]
fn test_load_missing_returns_none() {
    let dir = tempdir().unwrap();
    assert!(Run::load(&dir.path().join("nope.json")).unwrap().is_none());
}

#[test]
fn test_result_serialized_shape() {
    let mut run = Run::new(RunId::new("run-1"));
    run.mark_suspended(suspend("collect"));
    let value = serde_json::to_value(run.to_result()).unwrap();

    assert_eq!(value["runId"], "run-1");
    assert_eq!(value["status"], "suspended");
    assert_eq!(value["currentStepId"], "collect");
    assert_eq!(value["suspendPayload"]["stepId"], "collect");
    assert!(value.get("finalOutput").is_none());
}
