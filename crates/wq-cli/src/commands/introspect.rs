//! Introspect command implementation

use anyhow::{Context, Result};
use std::time::Duration;
use wq_core::presentation::{render_markdown, render_prompt_description};
use wq_core::DatasetTarget;

use crate::cli::{GlobalArgs, IntrospectArgs, SchemaFormat};
use crate::context::RuntimeContext;

/// Execute the introspect command
pub(crate) async fn execute(args: &IntrospectArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::load(global)?;
    let introspector = ctx.introspector(ctx.warehouse()?);
    let target = build_target(args);
    let limit = Duration::from_secs(ctx.config.timeouts.introspection_secs);

    let schema = tokio::time::timeout(
        limit,
        introspector.introspect(ctx.config.default_project.as_deref(), &[target]),
    )
    .await
    .with_context(|| format!("Introspection timed out after {}s", limit.as_secs()))??;

    for issue in &schema.issues {
        log::warn!("{} {}: {}", issue.dataset, issue.stage, issue.message);
    }

    match args.output {
        SchemaFormat::Markdown => print!("{}", render_markdown(&schema)),
        SchemaFormat::Prompt => print!("{}", render_prompt_description(&schema)),
        SchemaFormat::Json => println!("{}", serde_json::to_string_pretty(&schema)?),
    }
    Ok(())
}

fn build_target(args: &IntrospectArgs) -> DatasetTarget {
    let mut target = DatasetTarget::new(args.dataset.trim());
    if let Some(project) = &args.project {
        target = target.with_project(project.trim());
    }
    if let Some(tables) = &args.tables {
        target = target.with_tables(
            tables
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        );
    }
    target
}
