//! Error types for wq-pipeline

use thiserror::Error;
use wq_core::{CoreError, RunStatus};
use wq_generate::GenerateError;
use wq_introspect::IntrospectError;

/// Errors returned by the engine to its caller.
///
/// These never change a run's state. Failures inside a step are
/// [`StepError`]s and end up on the run instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Pipeline definition rejected (P001)
    #[error("[P001] Invalid pipeline: {0}")]
    InvalidPipeline(String),

    /// No stored run with this id (P002)
    #[error("[P002] Run '{run_id}' not found")]
    RunNotFound { run_id: String },

    /// Start requested for an id that is already taken (P003)
    #[error("[P003] Run '{run_id}' already exists")]
    RunAlreadyExists { run_id: String },

    /// Resume requested for a run that is not waiting for input (P004)
    #[error("[P004] Run '{run_id}' is {status}, not suspended")]
    RunNotSuspended { run_id: String, status: RunStatus },

    /// Resume addressed to a step other than the suspended one (P005)
    #[error("[P005] Run is suspended at step '{expected}', not '{got}'")]
    StepMismatch { expected: String, got: String },

    /// Resume input does not match the step's contract (P006)
    #[error("[P006] Invalid resume input for step '{step_id}': {message}")]
    InvalidResumeInput { step_id: String, message: String },

    /// Run id cannot be used as a storage key (P007)
    #[error("[P007] Invalid run id '{run_id}': only letters, digits, '-' and '_' are allowed")]
    InvalidRunId { run_id: String },

    /// Run store failure (P008)
    #[error("[P008] Run store error: {0}")]
    Store(#[from] CoreError),
}

/// Result type alias for PipelineError
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Category of a step failure, recorded on the failed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepErrorKind {
    MalformedReference,
    MissingDefaultProject,
    UnsafeIdentifier,
    GenerationFailure,
    PipelineContractViolation,
    Timeout,
    Cancelled,
    Internal,
}

impl std::fmt::Display for StepErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StepErrorKind::MalformedReference => "MalformedReference",
            StepErrorKind::MissingDefaultProject => "MissingDefaultProject",
            StepErrorKind::UnsafeIdentifier => "UnsafeIdentifier",
            StepErrorKind::GenerationFailure => "GenerationFailure",
            StepErrorKind::PipelineContractViolation => "PipelineContractViolation",
            StepErrorKind::Timeout => "Timeout",
            StepErrorKind::Cancelled => "Cancelled",
            StepErrorKind::Internal => "Internal",
        };
        f.write_str(name)
    }
}

/// A step failure: aborts the step and fails the run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct StepError {
    pub kind: StepErrorKind,
    pub message: String,
}

impl StepError {
    pub fn new(kind: StepErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn contract(message: impl Into<String>) -> Self {
        Self::new(StepErrorKind::PipelineContractViolation, message)
    }
}

impl From<IntrospectError> for StepError {
    fn from(err: IntrospectError) -> Self {
        let kind = match err.core_error() {
            CoreError::MalformedReference { .. } => StepErrorKind::MalformedReference,
            CoreError::MissingDefaultProject { .. } => StepErrorKind::MissingDefaultProject,
            CoreError::UnsafeIdentifier { .. } => StepErrorKind::UnsafeIdentifier,
            _ => StepErrorKind::Internal,
        };
        StepError::new(kind, err.to_string())
    }
}

impl From<GenerateError> for StepError {
    fn from(err: GenerateError) -> Self {
        StepError::new(StepErrorKind::GenerationFailure, err.to_string())
    }
}
