//! The pipeline driver
//!
//! Runs move `running -> {suspended <-> running} -> {succeeded | failed}`.
//! Every transition is written to the store before the call returns, and
//! calls for the same run id are serialized by a per-run lock so no two
//! steps of one run ever execute at once. A lock lives only while some
//! call holds or waits on it.

use crate::error::{PipelineError, PipelineResult, StepErrorKind};
use crate::pipeline::Pipeline;
use crate::step::{StepContext, StepOutcome};
use crate::store::RunStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::Mutex;
use wq_core::{Run, RunFailure, RunId, RunResult, RunStatus, SuspendPayload};

/// Drives runs of one pipeline against one store
pub struct Engine {
    pipeline: Arc<Pipeline>,
    store: Arc<dyn RunStore>,
    locks: StdMutex<HashMap<RunId, Arc<Mutex<()>>>>,
}

/// A claim on the per-run lock of one run id.
///
/// The map entry is removed when the last claim is dropped.
struct RunLock<'a> {
    locks: &'a StdMutex<HashMap<RunId, Arc<Mutex<()>>>>,
    run_id: RunId,
    lock: Arc<Mutex<()>>,
}

impl Drop for RunLock<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one here
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.run_id);
        }
    }
}

impl Engine {
    pub fn new(pipeline: Pipeline, store: Arc<dyn RunStore>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            store,
            locks: StdMutex::new(HashMap::new()),
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Create a run and drive it until it suspends or finishes.
    ///
    /// A fresh id is generated when `run_id` is `None`.
    pub async fn start(&self, run_id: Option<RunId>) -> PipelineResult<RunResult> {
        let run_id = run_id.unwrap_or_else(RunId::generate);
        let run_lock = self.lock_for(&run_id);
        let _guard = run_lock.lock.lock().await;

        if self.store.load(&run_id).await?.is_some() {
            return Err(PipelineError::RunAlreadyExists {
                run_id: run_id.to_string(),
            });
        }

        let mut run = Run::new(run_id);
        self.store.save(&run).await?;
        log::info!("Started run {}", run.run_id);

        self.drive(&mut run, None).await?;
        Ok(run.to_result())
    }

    /// Answer the suspension of `run_id` at `step_id` and continue the run.
    ///
    /// Rejected resumes leave the stored run untouched.
    pub async fn resume(
        &self,
        run_id: &RunId,
        step_id: &str,
        input: Value,
    ) -> PipelineResult<RunResult> {
        let run_lock = self.lock_for(run_id);
        let _guard = run_lock.lock.lock().await;

        let mut run = self.load_existing(run_id).await?;
        if run.status != RunStatus::Suspended {
            return Err(PipelineError::RunNotSuspended {
                run_id: run_id.to_string(),
                status: run.status,
            });
        }

        let expected = run
            .pending
            .as_ref()
            .map(|p| p.step_id.to_string())
            .unwrap_or_default();
        if expected != step_id {
            return Err(PipelineError::StepMismatch {
                expected,
                got: step_id.to_string(),
            });
        }

        let (pending_id, step) = self
            .pipeline
            .step(run.next_step_index())
            .ok_or_else(|| PipelineError::InvalidPipeline(format!(
                "run {} is suspended at '{}' which this pipeline does not have at position {}",
                run_id,
                step_id,
                run.next_step_index()
            )))?;
        if pending_id != step_id {
            return Err(PipelineError::StepMismatch {
                expected: pending_id.to_string(),
                got: step_id.to_string(),
            });
        }
        step.check_resume(&input)
            .map_err(|message| PipelineError::InvalidResumeInput {
                step_id: step_id.to_string(),
                message,
            })?;

        log::info!("Resuming run {} at step '{}'", run_id, step_id);
        run.mark_resumed();
        self.drive(&mut run, Some(input)).await?;
        Ok(run.to_result())
    }

    /// Current externally visible state of a run
    pub async fn status(&self, run_id: &RunId) -> PipelineResult<RunResult> {
        run_status(self.store.as_ref(), run_id).await
    }

    /// Mark a non-terminal run `failed`, waiting for any in-flight step of
    /// the run to finish first. Finished runs are returned unchanged.
    pub async fn cancel(&self, run_id: &RunId) -> PipelineResult<RunResult> {
        let run_lock = self.lock_for(run_id);
        let _guard = run_lock.lock.lock().await;

        cancel_run(self.store.as_ref(), run_id).await
    }

    /// Execute steps from the first one without an output until the run
    /// suspends, fails, or completes the last step.
    async fn drive(&self, run: &mut Run, mut resume: Option<Value>) -> PipelineResult<()> {
        loop {
            let index = run.next_step_index();
            let Some((step_id, step)) = self.pipeline.step(index) else {
                run.mark_succeeded();
                self.store.save(run).await?;
                log::info!("Run {} succeeded", run.run_id);
                return Ok(());
            };

            let step_id = step_id.clone();
            let input = run.last_output().cloned().unwrap_or(Value::Null);
            log::debug!("Run {}: executing step '{}'", run.run_id, step_id);

            let ctx = StepContext::new(&run.run_id, &run.steps);
            let outcome = step.run(ctx, input, resume.take()).await;

            match outcome {
                StepOutcome::Completed(output) => {
                    run.record_step(step_id, output);
                    self.store.save(run).await?;
                }
                StepOutcome::Suspended(suspension) => {
                    log::info!("Run {} suspended at step '{}'", run.run_id, step_id);
                    run.mark_suspended(SuspendPayload {
                        step_id,
                        message: suspension.message,
                        schema_snapshot: suspension.snapshot,
                    });
                    self.store.save(run).await?;
                    return Ok(());
                }
                StepOutcome::Failed(err) => {
                    log::warn!("Run {} failed at step '{}': {}", run.run_id, step_id, err);
                    run.mark_failed(RunFailure {
                        step_id: Some(step_id),
                        kind: err.kind.to_string(),
                        message: err.message,
                    });
                    self.store.save(run).await?;
                    return Ok(());
                }
            }
        }
    }

    async fn load_existing(&self, run_id: &RunId) -> PipelineResult<Run> {
        load_existing(self.store.as_ref(), run_id).await
    }

    fn lock_for(&self, run_id: &RunId) -> RunLock<'_> {
        let lock = self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(run_id.clone())
            .or_default()
            .clone();
        RunLock {
            locks: &self.locks,
            run_id: run_id.clone(),
            lock,
        }
    }
}

async fn load_existing(store: &dyn RunStore, run_id: &RunId) -> PipelineResult<Run> {
    store
        .load(run_id)
        .await?
        .ok_or_else(|| PipelineError::RunNotFound {
            run_id: run_id.to_string(),
        })
}

/// Current state of a stored run, read without an engine
pub async fn run_status(store: &dyn RunStore, run_id: &RunId) -> PipelineResult<RunResult> {
    Ok(load_existing(store, run_id).await?.to_result())
}

/// Mark a stored, non-terminal run `failed` with a cancellation error.
///
/// Does not coordinate with an engine driving the same run in this process;
/// use [`Engine::cancel`] there.
pub async fn cancel_run(store: &dyn RunStore, run_id: &RunId) -> PipelineResult<RunResult> {
    let mut run = load_existing(store, run_id).await?;
    if run.status.is_terminal() {
        log::debug!("Run {} already {}, nothing to cancel", run_id, run.status);
        return Ok(run.to_result());
    }

    let step_id = run.pending.as_ref().map(|p| p.step_id.clone());
    run.mark_failed(RunFailure {
        step_id,
        kind: StepErrorKind::Cancelled.to_string(),
        message: "run cancelled".to_string(),
    });
    store.save(&run).await?;
    log::info!("Cancelled run {}", run_id);
    Ok(run.to_result())
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
