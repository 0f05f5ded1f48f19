//! SELECT-only query execution
//!
//! The guardrail runs before the warehouse is touched, so a rejected
//! statement never costs a backend call.

use crate::error::ExecutionError;
use crate::traits::Warehouse;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use wq_core::Row;

/// Runs user-approved SQL against a warehouse
#[derive(Clone)]
pub struct QueryExecutor {
    warehouse: Arc<dyn Warehouse>,
    timeout: Option<Duration>,
}

impl QueryExecutor {
    pub fn new(warehouse: Arc<dyn Warehouse>) -> Self {
        Self {
            warehouse,
            timeout: None,
        }
    }

    /// Bound each execution by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Execute a single SELECT statement and return validated rows
    pub async fn execute(&self, sql: &str) -> Result<Vec<Row>, ExecutionError> {
        ensure_select_only(sql)?;

        log::info!("Executing query on {}", self.warehouse.db_type());
        let raw = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.warehouse.query(sql))
                .await
                .map_err(|_| ExecutionError::Timeout {
                    secs: limit.as_secs(),
                })??,
            None => self.warehouse.query(sql).await?,
        };

        let rows = validate_rows(raw)?;
        log::debug!("Query returned {} rows", rows.len());
        Ok(rows)
    }
}

/// Reject anything whose trimmed, lower-cased text does not begin with `select`
pub fn ensure_select_only(sql: &str) -> Result<(), ExecutionError> {
    let trimmed = sql.trim();
    if trimmed.to_lowercase().starts_with("select") {
        Ok(())
    } else {
        Err(ExecutionError::DisallowedStatement {
            statement: trimmed.chars().take(80).collect(),
        })
    }
}

/// Check every row is a key/value object
pub fn validate_rows(raw: Vec<Value>) -> Result<Vec<Row>, ExecutionError> {
    raw.into_iter()
        .enumerate()
        .map(|(row_index, value)| match value {
            Value::Object(map) => Ok(map),
            other => Err(ExecutionError::ValidationFailure {
                row_index,
                message: format!("expected an object, got {}", json_kind(&other)),
            }),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
