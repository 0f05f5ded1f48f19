//! The natural-language query pipeline
//!
//! `get-dataset-info -> introspect-bigquery -> generate-sql -> review-and-execute`

mod collect;
mod generate;
mod introspect;
mod review;

pub use collect::{CollectDatasetsStep, DatasetSelection, COLLECT_STEP_ID};
pub use generate::{GenerateSqlStep, GeneratedQuery, QuestionInput, GENERATE_STEP_ID};
pub use introspect::{IntrospectStep, IntrospectedSchema, INTROSPECT_STEP_ID};
pub use review::{ReviewDecision, ReviewStep, REVIEW_STEP_ID};

use crate::error::PipelineResult;
use crate::pipeline::Pipeline;
use std::sync::Arc;
use std::time::Duration;
use wq_core::config::TimeoutConfig;
use wq_db::{QueryExecutor, Warehouse};
use wq_generate::SqlGenerator;
use wq_introspect::{IntrospectOptions, Introspector};

/// Collaborators of the query pipeline, constructed by the caller
pub struct QueryPipelineParts {
    pub warehouse: Arc<dyn Warehouse>,
    pub generator: Arc<dyn SqlGenerator>,
    pub default_project: Option<String>,
    pub options: IntrospectOptions,
    pub timeouts: TimeoutConfig,
}

/// Assemble the four-step query pipeline
pub fn query_pipeline(parts: QueryPipelineParts) -> PipelineResult<Pipeline> {
    let introspector = Introspector::new(parts.warehouse.clone()).with_options(parts.options);
    let executor = QueryExecutor::new(parts.warehouse)
        .with_timeout(Duration::from_secs(parts.timeouts.execution_secs));

    Pipeline::builder()
        .then(CollectDatasetsStep)
        .then(IntrospectStep::new(
            introspector,
            parts.default_project,
            Duration::from_secs(parts.timeouts.introspection_secs),
        ))
        .then(GenerateSqlStep::new(
            parts.generator,
            Duration::from_secs(parts.timeouts.generation_secs),
        ))
        .then(ReviewStep::new(executor))
        .build()
}

#[cfg(test)]
#[path = "steps_test.rs"]
mod tests;
