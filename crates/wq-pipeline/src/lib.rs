//! wq-pipeline - Resumable step pipelines
//!
//! A [`Pipeline`] is a statically typed list of [`Step`]s. The [`Engine`]
//! drives runs through it, persisting each completed step's output to a
//! [`RunStore`] so a suspended run resumes with only the new input.
//!
//! [`steps`] holds the natural-language query pipeline built on top.

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod step;
pub mod steps;
pub mod store;

pub use engine::{cancel_run, run_status, Engine};
pub use error::{PipelineError, PipelineResult, StepError, StepErrorKind};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use step::{Step, StepContext, StepOutcome, Suspension};
pub use steps::{query_pipeline, QueryPipelineParts};
pub use store::{FileRunStore, MemoryRunStore, RunStore};
