//! Typed pipeline construction and type-erased step storage

use crate::error::{PipelineError, PipelineResult, StepError};
use crate::step::{Step, StepContext, StepOutcome};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::marker::PhantomData;
use wq_core::StepId;

/// A step with its types erased to JSON at the storage boundary
#[async_trait]
pub(crate) trait ErasedStep: Send + Sync {
    fn id(&self) -> &'static str;

    /// Check `resume` against the step's resume contract without running it
    fn check_resume(&self, resume: &Value) -> Result<(), String>;

    async fn run(
        &self,
        ctx: StepContext<'_>,
        input: Value,
        resume: Option<Value>,
    ) -> StepOutcome<Value>;
}

struct Typed<S>(S);

#[async_trait]
impl<S: Step> ErasedStep for Typed<S> {
    fn id(&self) -> &'static str {
        self.0.id()
    }

    fn check_resume(&self, resume: &Value) -> Result<(), String> {
        serde_json::from_value::<S::Resume>(resume.clone())
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn run(
        &self,
        ctx: StepContext<'_>,
        input: Value,
        resume: Option<Value>,
    ) -> StepOutcome<Value> {
        let input: S::Input = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => {
                return StepOutcome::Failed(StepError::contract(format!(
                    "stored input does not match step '{}': {}",
                    self.id(),
                    e
                )))
            }
        };
        let resume = match resume.map(serde_json::from_value::<S::Resume>).transpose() {
            Ok(resume) => resume,
            Err(e) => {
                return StepOutcome::Failed(StepError::contract(format!(
                    "resume input does not match step '{}': {}",
                    self.id(),
                    e
                )))
            }
        };

        match self.0.execute(ctx, input, resume).await {
            StepOutcome::Completed(output) => match serde_json::to_value(output) {
                Ok(value) => StepOutcome::Completed(value),
                Err(e) => StepOutcome::Failed(StepError::contract(format!(
                    "output of step '{}' could not be serialized: {}",
                    self.id(),
                    e
                ))),
            },
            StepOutcome::Suspended(s) => StepOutcome::Suspended(s),
            StepOutcome::Failed(e) => StepOutcome::Failed(e),
        }
    }
}

/// An ordered, validated list of steps
pub struct Pipeline {
    steps: Vec<(StepId, Box<dyn ErasedStep>)>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.step_ids())
            .finish()
    }
}

impl Pipeline {
    /// Start a pipeline whose first step takes `()`
    pub fn builder() -> PipelineBuilder<()> {
        PipelineBuilder {
            steps: Vec::new(),
            _last: PhantomData,
        }
    }

    pub fn step_ids(&self) -> Vec<&'static str> {
        self.steps.iter().map(|(_, s)| s.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The step at `index` with its validated id
    pub(crate) fn step(&self, index: usize) -> Option<(&StepId, &dyn ErasedStep)> {
        self.steps.get(index).map(|(id, s)| (id, s.as_ref()))
    }
}

/// Builds a [`Pipeline`], tracking the last step's output type in `Last`
pub struct PipelineBuilder<Last> {
    steps: Vec<Box<dyn ErasedStep>>,
    _last: PhantomData<fn() -> Last>,
}

impl<Last> PipelineBuilder<Last> {
    /// Append a step consuming the previous step's output
    pub fn then<S>(mut self, step: S) -> PipelineBuilder<S::Output>
    where
        S: Step<Input = Last>,
    {
        self.steps.push(Box::new(Typed(step)));
        PipelineBuilder {
            steps: self.steps,
            _last: PhantomData,
        }
    }

    /// Validate and finish. Requires at least one step and unique, non-empty
    /// step ids.
    pub fn build(self) -> PipelineResult<Pipeline> {
        if self.steps.is_empty() {
            return Err(PipelineError::InvalidPipeline(
                "a pipeline needs at least one step".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut steps = Vec::with_capacity(self.steps.len());
        for (position, step) in self.steps.into_iter().enumerate() {
            let id = StepId::try_new(step.id()).ok_or_else(|| {
                PipelineError::InvalidPipeline(format!(
                    "step at position {} has an empty id",
                    position
                ))
            })?;
            if !seen.insert(step.id()) {
                return Err(PipelineError::InvalidPipeline(format!(
                    "duplicate step id '{}'",
                    id
                )));
            }
            steps.push((id, step));
        }

        Ok(Pipeline { steps })
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
