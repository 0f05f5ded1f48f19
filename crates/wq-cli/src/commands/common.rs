//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use serde_json::Value;
use std::fmt;
use wq_core::{ExecutionOutcome, Row, RunId, RunResult, RunStatus, SqlCandidate, SuspendPayload};

use crate::cli::OutputFormat;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that destructors run before the process exits.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main exits without printing it.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

pub(crate) fn parse_run_id(raw: &str) -> Result<RunId> {
    RunId::try_new(raw.trim()).context("Run id must not be empty")
}

/// Print a run result, failing with exit code 1 if the run failed
pub(crate) fn report_run(result: &RunResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(result).context("Failed to serialize run")?;
            println!("{}", json);
        }
        OutputFormat::Text => print_run_text(result),
    }

    if result.status == RunStatus::Failed {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

fn print_run_text(result: &RunResult) {
    println!("Run:    {}", result.run_id);
    println!("Status: {}", result.status);
    if let Some(step) = &result.current_step_id {
        println!("Step:   {}", step);
    }

    match result.status {
        RunStatus::Suspended => {
            if let Some(payload) = &result.suspend_payload {
                println!();
                print_suspension(payload);
                println!();
                println!(
                    "Continue with: wq resume {} {} '<json>'",
                    result.run_id, payload.step_id
                );
            }
        }
        RunStatus::Succeeded => {
            if let Some(output) = &result.final_output {
                println!();
                print_final_output(output);
            }
        }
        RunStatus::Failed => {
            if let Some(error) = &result.error {
                println!("Error:  {}", error);
            }
        }
        RunStatus::Running => {}
    }
}

/// Show what a suspended step is asking for
pub(crate) fn print_suspension(payload: &SuspendPayload) {
    match &payload.schema_snapshot {
        Some(Value::String(text)) => println!("{}\n", text),
        Some(snapshot) => match serde_json::from_value::<SqlCandidate>(snapshot.clone()) {
            Ok(candidate) => print_candidate(&candidate),
            Err(_) => println!(
                "{}\n",
                serde_json::to_string_pretty(snapshot).unwrap_or_else(|_| snapshot.to_string())
            ),
        },
        None => {}
    }
    println!("{}", payload.message);
}

fn print_candidate(candidate: &SqlCandidate) {
    println!("Generated SQL (confidence {:.0}%):\n", candidate.confidence * 100.0);
    println!("{}\n", candidate.sql.trim());
    println!("Explanation: {}", candidate.explanation);
    if !candidate.assumptions.is_empty() {
        println!("Assumptions:");
        for assumption in &candidate.assumptions {
            println!("  - {}", assumption);
        }
    }
    if !candidate.tables_used.is_empty() {
        println!("Tables: {}", candidate.tables_used.join(", "));
    }
    println!();
}

fn print_final_output(output: &Value) {
    let Ok(outcome) = serde_json::from_value::<ExecutionOutcome>(output.clone()) else {
        println!(
            "{}",
            serde_json::to_string_pretty(output).unwrap_or_else(|_| output.to_string())
        );
        return;
    };

    println!("SQL: {}", outcome.final_sql.trim());
    if let Some(note) = &outcome.modifications {
        println!("Note: {}", note);
    }
    if let Some(error) = &outcome.error {
        println!("Error: {}", error);
    }
    if let Some(rows) = &outcome.rows {
        println!();
        print_rows(rows);
    }
}

/// Print rows as a table followed by a row count
pub(crate) fn print_rows(rows: &[Row]) {
    let (headers, cells) = rows_to_table(rows);
    if !headers.is_empty() {
        let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
        print_table(&header_refs, &cells);
    }
    println!(
        "\n({} row{})",
        rows.len(),
        if rows.len() == 1 { "" } else { "s" }
    );
}

/// Column names in first-seen order and the rendered cells
pub(crate) fn rows_to_table(rows: &[Row]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let cells = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(h).map(render_cell).unwrap_or_default())
                .collect()
        })
        .collect();
    (headers, cells)
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Calculate column widths for a table given headers and row data.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }
    widths
}

/// Print a left-aligned table with a dashed separator under the header.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  "));

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  "));
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
