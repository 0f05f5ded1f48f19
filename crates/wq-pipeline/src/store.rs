//! Run persistence

use crate::error::{PipelineError, PipelineResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use wq_core::{Run, RunId};

/// Storage for run state, injected into the engine
#[async_trait]
pub trait RunStore: Send + Sync {
    async fn load(&self, run_id: &RunId) -> PipelineResult<Option<Run>>;

    /// Insert or replace the stored run
    async fn save(&self, run: &Run) -> PipelineResult<()>;
}

/// Process-local store; runs are lost on exit
#[derive(Debug, Default)]
pub struct MemoryRunStore {
    runs: Mutex<HashMap<RunId, Run>>,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RunStore for MemoryRunStore {
    async fn load(&self, run_id: &RunId) -> PipelineResult<Option<Run>> {
        Ok(self.runs.lock().await.get(run_id).cloned())
    }

    async fn save(&self, run: &Run) -> PipelineResult<()> {
        self.runs
            .lock()
            .await
            .insert(run.run_id.clone(), run.clone());
        Ok(())
    }
}

/// One JSON file per run under a directory
#[derive(Debug, Clone)]
pub struct FileRunStore {
    dir: PathBuf,
}

impl FileRunStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the state file for `run_id`
    pub fn path_for(&self, run_id: &RunId) -> PipelineResult<PathBuf> {
        let valid = !run_id.is_empty()
            && run_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PipelineError::InvalidRunId {
                run_id: run_id.to_string(),
            });
        }
        Ok(self.dir.join(format!("{}.json", run_id)))
    }
}

#[async_trait]
impl RunStore for FileRunStore {
    async fn load(&self, run_id: &RunId) -> PipelineResult<Option<Run>> {
        let path = self.path_for(run_id)?;
        Ok(Run::load(&path)?)
    }

    async fn save(&self, run: &Run) -> PipelineResult<()> {
        let path = self.path_for(&run.run_id)?;
        run.save(&path)?;
        log::debug!("Saved run {} to {}", run.run_id, path.display());
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
