use super::*;
use std::collections::HashMap;
use wq_core::CoreError;

fn completion(content: &str) -> Value {
    json!({
        "id": "gen-1",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
}

const GOOD: &str = r#"{
    "sql": "SELECT COUNT(*) AS n FROM `p.d.users`",
    "explanation": "Counts users",
    "confidence": 0.92,
    "assumptions": ["users are rows of p.d.users"],
    "tables_used": ["p.d.users"]
}"#;

#[test]
fn test_parse_plain_json() {
    let candidate = parse_completion(&completion(GOOD)).unwrap();
    assert_eq!(candidate.sql, "SELECT COUNT(*) AS n FROM `p.d.users`");
    assert_eq!(candidate.confidence, 0.92);
    assert_eq!(candidate.tables_used, vec!["p.d.users".to_string()]);
}

#[test]
fn test_parse_fenced_json() {
    let fenced = format!("```json\n{}\n```", GOOD);
    let candidate = parse_completion(&completion(&fenced)).unwrap();
    assert_eq!(candidate.explanation, "Counts users");

    let bare = format!("```\n{}\n```", GOOD);
    assert!(parse_candidate(&bare).is_ok());
}

#[test]
fn test_optional_lists_default_to_empty() {
    let candidate =
        parse_candidate(r#"{"sql": "SELECT 1", "explanation": "one", "confidence": 1}"#).unwrap();
    assert!(candidate.assumptions.is_empty());
    assert!(candidate.tables_used.is_empty());
}

#[test]
fn test_missing_content_is_empty_response() {
    let err = parse_completion(&json!({"choices": []})).unwrap_err();
    assert!(matches!(err, GenerateError::EmptyResponse));

    let err = parse_completion(&completion("   ")).unwrap_err();
    assert!(matches!(err, GenerateError::EmptyResponse));
}

#[test]
fn test_prose_is_unparsable() {
    let err = parse_completion(&completion("Sure! Here is your query: SELECT 1")).unwrap_err();
    assert!(matches!(err, GenerateError::Unparsable(_)));
}

#[test]
fn test_out_of_range_confidence_rejected() {
    let err =
        parse_candidate(r#"{"sql": "SELECT 1", "explanation": "x", "confidence": 1.7}"#).unwrap_err();
    assert!(matches!(err, GenerateError::InvalidCandidate(_)));
    assert!(err.to_string().starts_with("[G005]"));
}

#[test]
fn test_empty_sql_rejected() {
    let err = parse_candidate(r#"{"sql": " ", "explanation": "x", "confidence": 0.5}"#).unwrap_err();
    assert!(matches!(err, GenerateError::InvalidCandidate(_)));
}

#[test]
fn test_from_config_requires_key() {
    let config = GeneratorConfig::default();
    let err = ChatSqlGenerator::from_config(&config, |_| None).unwrap_err();
    match err {
        GenerateError::Config(CoreError::MissingEnvVar { name }) => {
            assert_eq!(name, "OPENROUTER_API_KEY")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_request_body_and_debug_hide_key() {
    let env: HashMap<&str, &str> = [("OPENROUTER_API_KEY", "sk-secret")].into();
    let config = GeneratorConfig {
        base_url: "https://llm.example.com/api/v1/".to_string(),
        ..GeneratorConfig::default()
    };
    let generator = ChatSqlGenerator::from_config(&config, |k| env.get(k).map(|v| v.to_string()))
        .unwrap()
        .with_dialect(SqlDialect::DuckDb);

    assert_eq!(generator.base_url, "https://llm.example.com/api/v1");
    assert!(!format!("{:?}", generator).contains("sk-secret"));

    let body = generator.request_body("how many users?", &UnifiedSchema::default());
    assert_eq!(body["model"], "openai/gpt-4.1");
    assert_eq!(body["response_format"]["type"], "json_object");
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(body["messages"][0]["content"]
        .as_str()
        .unwrap()
        .contains("DuckDB SQL"));
    assert!(body["messages"][1]["content"]
        .as_str()
        .unwrap()
        .ends_with("how many users?"));
}
