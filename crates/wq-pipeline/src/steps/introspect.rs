use super::collect::DatasetSelection;
use crate::error::{StepError, StepErrorKind};
use crate::step::{Step, StepContext, StepOutcome};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wq_core::presentation::render_markdown;
use wq_core::{DatasetTarget, UnifiedSchema};
use wq_introspect::Introspector;

pub const INTROSPECT_STEP_ID: &str = "introspect-bigquery";

/// Selected datasets with their merged schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectedSchema {
    pub datasets: Vec<DatasetTarget>,
    pub schema: UnifiedSchema,
    /// Markdown rendering of `schema` shown to the user
    pub schema_presentation: String,
}

/// Introspects the selected datasets; never suspends
pub struct IntrospectStep {
    introspector: Introspector,
    default_project: Option<String>,
    timeout: Duration,
}

impl IntrospectStep {
    pub fn new(introspector: Introspector, default_project: Option<String>, timeout: Duration) -> Self {
        Self {
            introspector,
            default_project,
            timeout,
        }
    }
}

#[async_trait]
impl Step for IntrospectStep {
    type Input = DatasetSelection;
    type Output = IntrospectedSchema;
    type Resume = ();

    fn id(&self) -> &'static str {
        INTROSPECT_STEP_ID
    }

    async fn execute(
        &self,
        _ctx: StepContext<'_>,
        input: DatasetSelection,
        _resume: Option<()>,
    ) -> StepOutcome<IntrospectedSchema> {
        let introspection = self
            .introspector
            .introspect(self.default_project.as_deref(), &input.datasets);

        let schema = match tokio::time::timeout(self.timeout, introspection).await {
            Ok(Ok(schema)) => schema,
            Ok(Err(err)) => return StepOutcome::Failed(StepError::from(err)),
            Err(_) => {
                return StepOutcome::Failed(StepError::new(
                    StepErrorKind::Timeout,
                    format!("introspection did not finish within {}s", self.timeout.as_secs()),
                ))
            }
        };

        StepOutcome::Completed(IntrospectedSchema {
            datasets: input.datasets,
            schema_presentation: render_markdown(&schema),
            schema,
        })
    }
}
