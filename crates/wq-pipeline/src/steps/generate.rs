use super::introspect::IntrospectedSchema;
use crate::error::{StepError, StepErrorKind};
use crate::step::{Step, StepContext, StepOutcome, Suspension};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use wq_core::{DatasetTarget, SqlCandidate};
use wq_generate::SqlGenerator;

pub const GENERATE_STEP_ID: &str = "generate-sql";

const PROMPT: &str = "Please enter your natural language query (e.g., 'Show me the top 10 posts by score', 'Find users with the most reputation'):";

/// The user's question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    pub natural_language_query: String,
}

/// A question with the SQL proposed for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuery {
    pub datasets: Vec<DatasetTarget>,
    pub natural_language_query: String,
    #[serde(rename = "generatedSQL")]
    pub generated_sql: SqlCandidate,
    pub schema_presentation: String,
}

/// Asks for a question and translates it to SQL
pub struct GenerateSqlStep {
    generator: Arc<dyn SqlGenerator>,
    timeout: Duration,
}

impl GenerateSqlStep {
    pub fn new(generator: Arc<dyn SqlGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }
}

#[async_trait]
impl Step for GenerateSqlStep {
    type Input = IntrospectedSchema;
    type Output = GeneratedQuery;
    type Resume = QuestionInput;

    fn id(&self) -> &'static str {
        GENERATE_STEP_ID
    }

    async fn execute(
        &self,
        _ctx: StepContext<'_>,
        input: IntrospectedSchema,
        resume: Option<QuestionInput>,
    ) -> StepOutcome<GeneratedQuery> {
        let question = match resume {
            Some(q) if !q.natural_language_query.trim().is_empty() => q.natural_language_query,
            _ => {
                return StepOutcome::Suspended(
                    Suspension::new(PROMPT)
                        .with_snapshot(Value::String(input.schema_presentation)),
                )
            }
        };

        log::info!("Generating SQL with {} generator", self.generator.name());
        let generation = self.generator.generate(&question, &input.schema);
        let candidate = match tokio::time::timeout(self.timeout, generation).await {
            Ok(Ok(candidate)) => candidate,
            Ok(Err(err)) => return StepOutcome::Failed(StepError::from(err)),
            Err(_) => {
                return StepOutcome::Failed(StepError::new(
                    StepErrorKind::Timeout,
                    format!("SQL generation did not finish within {}s", self.timeout.as_secs()),
                ))
            }
        };

        StepOutcome::Completed(GeneratedQuery {
            datasets: input.datasets,
            natural_language_query: question,
            generated_sql: candidate,
            schema_presentation: input.schema_presentation,
        })
    }
}
