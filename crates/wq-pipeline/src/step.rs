//! The step contract
//!
//! A step is invoked with the previous step's output and, when resuming, the
//! external actor's answer. It returns one of three outcomes; the engine
//! persists the result and decides what runs next.

use crate::error::StepError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use wq_core::{RunId, StepRecord};

/// What a suspended step hands to the external actor
#[derive(Debug, Clone, PartialEq)]
pub struct Suspension {
    pub message: String,
    pub snapshot: Option<Value>,
}

impl Suspension {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            snapshot: None,
        }
    }

    pub fn with_snapshot(mut self, snapshot: Value) -> Self {
        self.snapshot = Some(snapshot);
        self
    }
}

/// Result of one step invocation
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome<T> {
    Completed(T),
    Suspended(Suspension),
    Failed(StepError),
}

impl<T> StepOutcome<T> {
    /// Shorthand for a suspension without snapshot
    pub fn suspend(message: impl Into<String>) -> Self {
        StepOutcome::Suspended(Suspension::new(message))
    }
}

/// Read-only view of the run a step executes in
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    run_id: &'a RunId,
    completed: &'a [StepRecord],
}

impl<'a> StepContext<'a> {
    pub fn new(run_id: &'a RunId, completed: &'a [StepRecord]) -> Self {
        Self { run_id, completed }
    }

    pub fn run_id(&self) -> &RunId {
        self.run_id
    }

    /// Output recorded by an earlier step of this run
    pub fn output_of(&self, step_id: &str) -> Option<&'a Value> {
        self.completed
            .iter()
            .find(|s| s.step_id == step_id)
            .map(|s| &s.output)
    }

    /// Ids of the steps completed so far, in order
    pub fn completed_steps(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.completed.iter().map(|s| s.step_id.as_str())
    }
}

/// One typed stage of a pipeline.
///
/// `Input` must be the previous step's `Output` (the first step takes `()`);
/// [`PipelineBuilder`](crate::PipelineBuilder) enforces this at compile time.
/// Steps that never suspend use `()` for `Resume`.
#[async_trait]
pub trait Step: Send + Sync + 'static {
    type Input: DeserializeOwned + Send + 'static;
    type Output: Serialize + DeserializeOwned + Send + 'static;
    type Resume: DeserializeOwned + Send + 'static;

    /// Stable id, unique within the pipeline
    fn id(&self) -> &'static str;

    async fn execute(
        &self,
        ctx: StepContext<'_>,
        input: Self::Input,
        resume: Option<Self::Resume>,
    ) -> StepOutcome<Self::Output>;
}
