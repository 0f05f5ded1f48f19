use super::*;

#[test]
fn test_parse_public_dataset() {
    let parsed = parse_project_dataset("bigquery-public-data.stackoverflow").unwrap();
    assert_eq!(parsed.project_id, "bigquery-public-data");
    assert_eq!(parsed.dataset_name, "stackoverflow");
    assert_eq!(parsed.to_string(), "bigquery-public-data.stackoverflow");
}

#[test]
fn test_parse_rejects_underscore_project() {
    let err = parse_project_dataset("bad_id.ds").unwrap_err();
    assert!(matches!(err, CoreError::MalformedReference { .. }));
    assert!(err.to_string().contains("[W001]"));
}

#[test]
fn test_parse_rejects_separator_count() {
    for input in ["stackoverflow", "a-project.ds.extra", ""] {
        let err = parse_project_dataset(input).unwrap_err();
        assert!(
            matches!(err, CoreError::MalformedReference { .. }),
            "expected MalformedReference for {input:?}"
        );
    }
}

#[test]
fn test_parse_rejects_empty_dataset() {
    assert!(parse_project_dataset("my-project.").is_err());
}

#[test]
fn test_project_id_rules() {
    assert!(is_valid_project_id("abcdef"));
    assert!(is_valid_project_id("my-project-42"));
    assert!(!is_valid_project_id("short"));
    assert!(!is_valid_project_id("1project"));
    assert!(!is_valid_project_id("Project-x"));
    assert!(!is_valid_project_id("trailing-"));
    assert!(!is_valid_project_id(&format!("a{}", "b".repeat(63))));
}

#[test]
fn test_safe_identifier() {
    assert!(is_safe_identifier("posts_questions"));
    assert!(is_safe_identifier("Users2"));
    assert!(!is_safe_identifier(""));
    assert!(!is_safe_identifier("users; DROP TABLE x"));
    assert!(!is_safe_identifier("my-table"));
    assert!(!is_safe_identifier("a.b"));
}

#[test]
fn test_ensure_safe_identifier_reports_kind() {
    let err = ensure_safe_identifier("table", "bad name").unwrap_err();
    assert!(err.to_string().contains("Unsafe table name 'bad name'"));
}

#[test]
fn test_ensure_safe_project_accepts_both_forms() {
    assert!(ensure_safe_project("bigquery-public-data").is_ok());
    assert!(ensure_safe_project("memory").is_ok());
    assert!(ensure_safe_project("wh").is_ok());
    assert!(ensure_safe_project("x`; drop").is_err());
}
