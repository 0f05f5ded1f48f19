use super::*;
use std::io::Cursor;

#[test]
fn test_dataset_answer() {
    let value = interpret_answer(
        COLLECT_STEP_ID,
        "bigquery-public-data.stackoverflow:posts,users  sales\n",
    )
    .unwrap();
    assert_eq!(
        value,
        json!({"datasets": [
            {"name": "bigquery-public-data.stackoverflow", "tables": ["posts", "users"]},
            {"name": "sales"}
        ]})
    );
}

#[test]
fn test_empty_dataset_answer_passes_through() {
    // The step itself re-prompts for an empty list.
    let value = interpret_answer(COLLECT_STEP_ID, "  ").unwrap();
    assert_eq!(value, json!({"datasets": []}));
}

#[test]
fn test_question_answer() {
    let value = interpret_answer(GENERATE_STEP_ID, "  top 10 posts by score \n").unwrap();
    assert_eq!(value, json!({"naturalLanguageQuery": "top 10 posts by score"}));
}

#[test]
fn test_review_answers() {
    assert_eq!(
        interpret_answer(REVIEW_STEP_ID, "Y").unwrap(),
        json!({"approved": true})
    );
    assert_eq!(
        interpret_answer(REVIEW_STEP_ID, "no").unwrap(),
        json!({"approved": false})
    );
    assert_eq!(
        interpret_answer(REVIEW_STEP_ID, "SELECT 1").unwrap(),
        json!({"modifiedSQL": "SELECT 1"})
    );
    assert!(interpret_answer(REVIEW_STEP_ID, "").is_err());
}

#[test]
fn test_json_answer_passes_through() {
    let value = interpret_answer(REVIEW_STEP_ID, r#"{"approved": false, "modifiedSQL": "SELECT 2"}"#)
        .unwrap();
    assert_eq!(value["modifiedSQL"], "SELECT 2");

    let err = interpret_answer(GENERATE_STEP_ID, "{not json").unwrap_err();
    assert!(err.contains("not valid JSON"));
}

#[test]
fn test_unknown_step_requires_json() {
    assert!(interpret_answer("custom-step", "hello").is_err());
    assert!(interpret_answer("custom-step", "{}").is_ok());
}

#[test]
fn test_read_answer_single_line() {
    let mut input = Cursor::new("how many users?\nignored\n");
    let answer = read_answer(&mut input).unwrap().unwrap();
    assert_eq!(answer.trim(), "how many users?");
}

#[test]
fn test_read_answer_multiline_json() {
    let mut input = Cursor::new("{\n  \"approved\": true\n}\nnext\n");
    let answer = read_answer(&mut input).unwrap().unwrap();
    assert_eq!(
        serde_json::from_str::<Value>(answer.trim()).unwrap(),
        json!({"approved": true})
    );
}

#[test]
fn test_read_answer_eof() {
    let mut input = Cursor::new("");
    assert!(read_answer(&mut input).unwrap().is_none());
}
