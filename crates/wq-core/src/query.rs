//! SQL candidates and execution outcomes

use serde::{Deserialize, Serialize};

/// A result row: column name to JSON value
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Modification note recorded when the reviewer edited the SQL
pub const NOTE_MODIFIED: &str = "Query was modified by user";

/// Modification note recorded when the reviewer rejected the SQL
pub const NOTE_NOT_APPROVED: &str = "Query was not approved";

/// SQL proposed by the generator for a natural-language question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlCandidate {
    pub sql: String,
    pub explanation: String,
    /// Generator confidence in `[0, 1]`
    pub confidence: f64,
    #[serde(default)]
    pub assumptions: Vec<String>,
    /// Fully-qualified `project.dataset.table` names
    #[serde(default)]
    pub tables_used: Vec<String>,
}

impl SqlCandidate {
    /// Check the candidate is usable, returning a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        if self.sql.trim().is_empty() {
            return Err("candidate SQL is empty".to_string());
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!(
                "confidence {} is outside the range [0, 1]",
                self.confidence
            ));
        }
        Ok(())
    }
}

/// Result of the approval gate and, when approved, the execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    pub success: bool,
    #[serde(rename = "finalSQL")]
    pub final_sql: String,
    #[serde(rename = "queryResult")]
    pub rows: Option<Vec<Row>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifications: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionOutcome {
    /// The reviewer neither approved nor edited the SQL
    pub fn not_approved(final_sql: impl Into<String>) -> Self {
        Self {
            success: false,
            final_sql: final_sql.into(),
            rows: None,
            row_count: None,
            modifications: Some(NOTE_NOT_APPROVED.to_string()),
            error: None,
        }
    }

    pub fn executed(final_sql: impl Into<String>, rows: Vec<Row>, modified: bool) -> Self {
        Self {
            success: true,
            final_sql: final_sql.into(),
            row_count: Some(rows.len()),
            rows: Some(rows),
            modifications: modified.then(|| NOTE_MODIFIED.to_string()),
            error: None,
        }
    }

    pub fn execution_failed(
        final_sql: impl Into<String>,
        error: impl Into<String>,
        modified: bool,
    ) -> Self {
        Self {
            success: false,
            final_sql: final_sql.into(),
            rows: None,
            row_count: None,
            modifications: modified.then(|| NOTE_MODIFIED.to_string()),
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
