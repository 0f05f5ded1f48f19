//! Exec command implementation

use anyhow::Result;
use std::time::Duration;
use wq_db::QueryExecutor;

use crate::cli::{ExecArgs, GlobalArgs, OutputFormat};
use crate::commands::common::print_rows;
use crate::context::RuntimeContext;

/// Execute the exec command
pub(crate) async fn execute(args: &ExecArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::load(global)?;
    let timeout = Duration::from_secs(ctx.config.timeouts.execution_secs);
    let executor = QueryExecutor::new(ctx.warehouse()?).with_timeout(timeout);

    let rows = executor.execute(&args.sql).await?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Text => print_rows(&rows),
    }
    Ok(())
}
