use crate::step::{Step, StepContext, StepOutcome};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wq_core::DatasetTarget;

pub const COLLECT_STEP_ID: &str = "get-dataset-info";

const PROMPT: &str = "Please provide your dataset information in the following format:
{
  \"datasets\": [
    {
      \"name\": \"your-dataset-name\",
      \"projectId\": \"your-project-id\" (optional),
      \"tables\": [\"table1\", \"table2\"] (empty for every table)
    }
  ]
}";

/// Datasets chosen by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSelection {
    pub datasets: Vec<DatasetTarget>,
}

/// Asks the user which datasets to work with
pub struct CollectDatasetsStep;

#[async_trait]
impl Step for CollectDatasetsStep {
    type Input = ();
    type Output = DatasetSelection;
    type Resume = DatasetSelection;

    fn id(&self) -> &'static str {
        COLLECT_STEP_ID
    }

    async fn execute(
        &self,
        _ctx: StepContext<'_>,
        _input: (),
        resume: Option<DatasetSelection>,
    ) -> StepOutcome<DatasetSelection> {
        match resume {
            None => StepOutcome::suspend(PROMPT),
            Some(selection) if selection.datasets.is_empty() => {
                StepOutcome::suspend(format!("At least one dataset is required.\n\n{}", PROMPT))
            }
            Some(selection) => StepOutcome::Completed(selection),
        }
    }
}
