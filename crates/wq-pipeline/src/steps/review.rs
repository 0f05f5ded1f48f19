use super::generate::GeneratedQuery;
use crate::error::{StepError, StepErrorKind};
use crate::step::{Step, StepContext, StepOutcome, Suspension};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wq_core::ExecutionOutcome;
use wq_db::{ExecutionError, QueryExecutor};

pub const REVIEW_STEP_ID: &str = "review-and-execute";

const PROMPT: &str = "Do you want to approve this SQL query or make modifications? (approved: true/false, modifiedSQL: 'your modified query' if needed)";

/// The reviewer's answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewDecision {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    /// Replacement SQL. Supplying it counts as approval.
    #[serde(default, rename = "modifiedSQL", skip_serializing_if = "Option::is_none")]
    pub modified_sql: Option<String>,
}

/// Approval gate in front of the query executor
pub struct ReviewStep {
    executor: QueryExecutor,
}

impl ReviewStep {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Step for ReviewStep {
    type Input = GeneratedQuery;
    type Output = ExecutionOutcome;
    type Resume = ReviewDecision;

    fn id(&self) -> &'static str {
        REVIEW_STEP_ID
    }

    async fn execute(
        &self,
        _ctx: StepContext<'_>,
        input: GeneratedQuery,
        resume: Option<ReviewDecision>,
    ) -> StepOutcome<ExecutionOutcome> {
        let Some(decision) = resume else {
            let snapshot = match serde_json::to_value(&input.generated_sql) {
                Ok(value) => value,
                Err(e) => return StepOutcome::Failed(StepError::contract(e.to_string())),
            };
            return StepOutcome::Suspended(Suspension::new(PROMPT).with_snapshot(snapshot));
        };

        let modified = decision.modified_sql.filter(|sql| !sql.trim().is_empty());
        let was_modified = modified.is_some();
        let approved = was_modified || decision.approved == Some(true);
        let final_sql = modified.unwrap_or(input.generated_sql.sql);

        if !approved {
            log::info!("SQL was not approved; skipping execution");
            return StepOutcome::Completed(ExecutionOutcome::not_approved(final_sql));
        }

        match self.executor.execute(&final_sql).await {
            Ok(rows) => StepOutcome::Completed(ExecutionOutcome::executed(final_sql, rows, was_modified)),
            Err(ExecutionError::Timeout { secs }) => StepOutcome::Failed(StepError::new(
                StepErrorKind::Timeout,
                format!("query execution did not finish within {}s", secs),
            )),
            Err(err) => {
                log::warn!("Query execution failed: {}", err);
                StepOutcome::Completed(ExecutionOutcome::execution_failed(
                    final_sql,
                    format!("Failed to execute SQL: {}", err),
                    was_modified,
                ))
            }
        }
    }
}
