//! Prompt construction for chat-based generators

use serde::{Deserialize, Serialize};
use wq_core::presentation::render_prompt_description;
use wq_core::UnifiedSchema;

/// SQL dialect the generated query must be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    BigQuery,
    DuckDb,
}

impl SqlDialect {
    fn label(self) -> &'static str {
        match self {
            SqlDialect::BigQuery => "BigQuery Standard SQL",
            SqlDialect::DuckDb => "DuckDB SQL",
        }
    }

    fn rules(self) -> &'static [&'static str] {
        match self {
            SqlDialect::BigQuery => &[
                "Use Standard SQL, never Legacy SQL.",
                "Quote every table as `project_id.dataset_name.table_name` with backticks.",
                "Prefer SAFE_CAST and SAFE_DIVIDE where values may be malformed.",
                "Use BigQuery types such as STRING, INT64, FLOAT64, TIMESTAMP and DATE.",
            ],
            SqlDialect::DuckDb => &[
                "Qualify every table as catalog.schema.table using the names shown.",
                "Use DuckDB functions and types such as VARCHAR, BIGINT, DOUBLE and DATE.",
            ],
        }
    }
}

impl std::fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// System prompt describing the schema and the expected JSON answer
pub fn system_prompt(dialect: SqlDialect, schema: &UnifiedSchema) -> String {
    let mut prompt = format!(
        "You translate natural-language questions into {} queries.\n\nDATABASE SCHEMA:\n{}\n\nRULES:\n",
        dialect.label(),
        render_prompt_description(schema)
    );

    let common = [
        "Only generate a single SELECT statement.",
        "Only reference tables and columns listed in the schema.",
        "Add a LIMIT unless the question asks for an aggregate.",
    ];
    for (i, rule) in common.iter().chain(dialect.rules()).enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, rule));
    }

    prompt.push_str(
        "\nAnswer with a JSON object only, with these fields:\n\
         - sql: the query\n\
         - explanation: what the query does\n\
         - confidence: a number between 0 and 1\n\
         - assumptions: list of assumptions made\n\
         - tables_used: list of fully-qualified table names\n",
    );
    prompt
}

/// User message carrying the question
pub fn user_prompt(question: &str) -> String {
    format!("Generate a SQL query for this question: {}", question.trim())
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;
