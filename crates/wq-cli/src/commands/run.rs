//! Run command implementation: drive a run interactively from stdin

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use wq_core::{RunResult, RunStatus};
use wq_pipeline::steps::{COLLECT_STEP_ID, GENERATE_STEP_ID, REVIEW_STEP_ID};
use wq_pipeline::{Engine, PipelineError};

use crate::cli::{GlobalArgs, OutputFormat, RunArgs};
use crate::commands::common::{parse_run_id, print_suspension, report_run};
use crate::context::RuntimeContext;

/// Execute the run command
pub(crate) async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::load(global)?;
    let engine = ctx.engine()?;

    let result = match &args.attach {
        Some(raw) => {
            let result = engine.status(&parse_run_id(raw)?).await?;
            if result.status != RunStatus::Suspended {
                bail!("Run {} is {}, not suspended", result.run_id, result.status);
            }
            result
        }
        None => {
            let run_id = args.run_id.as_deref().map(parse_run_id).transpose()?;
            engine.start(run_id).await?
        }
    };

    let stdin = io::stdin();
    let Some(result) = answer_loop(&engine, result, &mut stdin.lock()).await? else {
        return Ok(());
    };

    println!();
    report_run(&result, OutputFormat::Text)
}

/// Answer suspensions until the run finishes. `None` means input ran out
/// and the run was left suspended.
async fn answer_loop(
    engine: &Engine,
    mut result: RunResult,
    input: &mut impl BufRead,
) -> Result<Option<RunResult>> {
    while result.status == RunStatus::Suspended {
        let Some(payload) = result.suspend_payload.clone() else {
            bail!("Run {} is suspended without a prompt", result.run_id);
        };

        println!();
        print_suspension(&payload);

        let Some(answer) = read_answer(input)? else {
            println!(
                "\nRun {} left suspended at {}; continue with: wq run --attach {}",
                result.run_id, payload.step_id, result.run_id
            );
            return Ok(None);
        };

        let value = match interpret_answer(payload.step_id.as_str(), &answer) {
            Ok(value) => value,
            Err(message) => {
                eprintln!("{}", message);
                continue;
            }
        };

        result = match engine.resume(&result.run_id, payload.step_id.as_str(), value).await {
            Ok(next) => next,
            Err(PipelineError::InvalidResumeInput { message, .. }) => {
                eprintln!("Answer not accepted: {}", message);
                continue;
            }
            Err(e) => return Err(e.into()),
        };
    }
    Ok(Some(result))
}

/// Read one answer. Input starting with `{` continues over further lines
/// until it parses as JSON.
fn read_answer(input: &mut impl BufRead) -> Result<Option<String>> {
    print!("> ");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    loop {
        let mut line = String::new();
        let read = input.read_line(&mut line).context("Failed to read answer")?;
        if read == 0 {
            return Ok(if answer.trim().is_empty() { None } else { Some(answer) });
        }
        answer.push_str(&line);

        let trimmed = answer.trim();
        if !trimmed.starts_with('{') || serde_json::from_str::<Value>(trimmed).is_ok() {
            return Ok(Some(answer));
        }
    }
}

/// Turn a typed answer into the resume payload for `step_id`.
///
/// JSON objects pass through unchanged. Otherwise:
/// - datasets: whitespace-separated `dataset` or `project.dataset`
///   references, each optionally followed by `:table,table`
/// - question: the text itself
/// - review: `y`/`yes` approves, `n`/`no` rejects, anything else is
///   taken as modified SQL
pub(crate) fn interpret_answer(step_id: &str, answer: &str) -> Result<Value, String> {
    let text = answer.trim();
    if text.starts_with('{') {
        return serde_json::from_str(text).map_err(|e| format!("Answer is not valid JSON: {}", e));
    }

    match step_id {
        COLLECT_STEP_ID => Ok(json!({ "datasets": parse_datasets(text) })),
        GENERATE_STEP_ID => Ok(json!({ "naturalLanguageQuery": text })),
        REVIEW_STEP_ID => match text.to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(json!({ "approved": true })),
            "n" | "no" => Ok(json!({ "approved": false })),
            "" => Err("Answer y, n, or enter modified SQL".to_string()),
            _ => Ok(json!({ "modifiedSQL": text })),
        },
        other => Err(format!("Step '{}' only accepts a JSON answer", other)),
    }
}

fn parse_datasets(text: &str) -> Vec<Value> {
    text.split_whitespace()
        .map(|token| match token.split_once(':') {
            Some((name, tables)) => {
                let tables: Vec<&str> = tables.split(',').filter(|t| !t.is_empty()).collect();
                json!({ "name": name, "tables": tables })
            }
            None => json!({ "name": token }),
        })
        .collect()
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
