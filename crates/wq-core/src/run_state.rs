//! Run state for resumable pipelines
//!
//! A [`Run`] accumulates one output per completed step. It grows
//! monotonically, so a resumed run continues from the first step without a
//! recorded output instead of replaying earlier steps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::error::CoreResult;
use crate::ids::define_id;

define_id! {
    /// Opaque unique identifier of a run
    pub struct RunId;
}

impl RunId {
    /// Generate a fresh random run id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

define_id! {
    /// Identifier of a step within a pipeline
    pub struct StepId;
}

/// Status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    /// Waiting for input from an external actor
    Suspended,
    Succeeded,
    Failed,
}

impl RunStatus {
    /// Whether no further transitions are possible
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Succeeded | RunStatus::Failed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Suspended => write!(f, "suspended"),
            RunStatus::Succeeded => write!(f, "succeeded"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Output of a completed step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step_id: StepId,
    pub output: Value,
    pub completed_at: DateTime<Utc>,
}

/// What a suspended step asks of the external actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspendPayload {
    pub step_id: StepId,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_snapshot: Option<Value>,
}

/// Why a run failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<StepId>,
    /// Error kind, e.g. `GenerationFailure`
    pub kind: String,
    pub message: String,
}

impl std::fmt::Display for RunFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.step_id {
            Some(step) => write!(f, "{} in step '{}': {}", self.kind, step, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// Persisted state of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub status: RunStatus,

    /// Outputs of completed steps, in pipeline order
    #[serde(default)]
    pub steps: Vec<StepRecord>,

    /// Present iff `status` is `suspended`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<SuspendPayload>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RunFailure>,
}

impl Run {
    /// Create a new run in the `running` state
    pub fn new(run_id: RunId) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            started_at: now,
            last_updated_at: now,
            status: RunStatus::Running,
            steps: Vec::new(),
            pending: None,
            error: None,
        }
    }

    /// Load run state from a file path
    pub fn load(path: &Path) -> CoreResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)?;
        let run: Run = serde_json::from_str(&content)?;
        Ok(Some(run))
    }

    /// Save run state to a file path atomically
    ///
    /// Uses write-to-temp-then-rename so readers never see a partial file.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Index of the next step to execute
    pub fn next_step_index(&self) -> usize {
        self.steps.len()
    }

    /// Output of the most recently completed step
    pub fn last_output(&self) -> Option<&Value> {
        self.steps.last().map(|s| &s.output)
    }

    /// Output recorded for `step_id`
    pub fn output_of(&self, step_id: &str) -> Option<&Value> {
        self.steps
            .iter()
            .find(|s| s.step_id == step_id)
            .map(|s| &s.output)
    }

    /// Record a completed step and return to `running`
    pub fn record_step(&mut self, step_id: StepId, output: Value) {
        self.steps.push(StepRecord {
            step_id,
            output,
            completed_at: Utc::now(),
        });
        self.pending = None;
        self.status = RunStatus::Running;
        self.touch();
    }

    pub fn mark_suspended(&mut self, payload: SuspendPayload) {
        self.pending = Some(payload);
        self.status = RunStatus::Suspended;
        self.touch();
    }

    /// Leave the suspended state ahead of re-invoking the pending step
    pub fn mark_resumed(&mut self) {
        self.pending = None;
        self.status = RunStatus::Running;
        self.touch();
    }

    pub fn mark_succeeded(&mut self) {
        self.pending = None;
        self.status = RunStatus::Succeeded;
        self.touch();
    }

    pub fn mark_failed(&mut self, failure: RunFailure) {
        self.pending = None;
        self.error = Some(failure);
        self.status = RunStatus::Failed;
        self.touch();
    }

    fn touch(&mut self) {
        self.last_updated_at = Utc::now();
    }

    /// Externally visible view of this run
    pub fn to_result(&self) -> RunResult {
        let current_step_id = match self.status {
            RunStatus::Suspended => self.pending.as_ref().map(|p| p.step_id.clone()),
            RunStatus::Failed => self.error.as_ref().and_then(|e| e.step_id.clone()),
            RunStatus::Succeeded | RunStatus::Running => {
                self.steps.last().map(|s| s.step_id.clone())
            }
        };

        RunResult {
            run_id: self.run_id.clone(),
            status: self.status,
            current_step_id,
            suspend_payload: self.pending.clone(),
            final_output: if self.status == RunStatus::Succeeded {
                self.last_output().cloned()
            } else {
                None
            },
            error: self.error.clone(),
        }
    }
}

/// What a pipeline driver call reports back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub run_id: RunId,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step_id: Option<StepId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspend_payload: Option<SuspendPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RunFailure>,
}

#[cfg(test)]
#[path = "run_state_test.rs"]
mod tests;
