//! Start command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, StartArgs};
use crate::commands::common::{parse_run_id, report_run};
use crate::context::RuntimeContext;

/// Execute the start command
pub(crate) async fn execute(args: &StartArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::load(global)?;
    let engine = ctx.engine()?;

    let run_id = args.run_id.as_deref().map(parse_run_id).transpose()?;
    let result = engine.start(run_id).await?;
    log::info!("Run {} is {}", result.run_id, result.status);

    report_run(&result, args.output)
}
