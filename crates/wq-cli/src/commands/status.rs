//! Status and cancel command implementations
//!
//! Both work on the run store alone, so neither needs warehouse or
//! generator credentials.

use anyhow::Result;
use wq_core::RunStatus;
use wq_pipeline::{cancel_run, run_status};

use crate::cli::{GlobalArgs, OutputFormat, RunRefArgs};
use crate::commands::common::{parse_run_id, report_run, ExitCode};
use crate::context::RuntimeContext;

/// Execute the status command
pub(crate) async fn execute(args: &RunRefArgs, global: &GlobalArgs) -> Result<()> {
    let run_id = parse_run_id(&args.run_id)?;
    let ctx = RuntimeContext::load(global)?;
    let result = run_status(&ctx.run_store(), &run_id).await?;

    // A failed run is reported, not treated as a command failure.
    match report_run(&result, args.output) {
        Err(err) if err.downcast_ref::<ExitCode>().is_some() => Ok(()),
        other => other,
    }
}

/// Execute the cancel command
pub(crate) async fn cancel(args: &RunRefArgs, global: &GlobalArgs) -> Result<()> {
    let run_id = parse_run_id(&args.run_id)?;
    let ctx = RuntimeContext::load(global)?;
    let store = ctx.run_store();

    let before = run_status(&store, &run_id).await?;
    let result = cancel_run(&store, &run_id).await?;

    if before.status == RunStatus::Failed || before.status == RunStatus::Succeeded {
        eprintln!("Run {} already {}; nothing to cancel", run_id, before.status);
    } else {
        log::info!("Cancelled run {}", run_id);
    }

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => println!("Run {} is {}", result.run_id, result.status),
    }
    Ok(())
}
