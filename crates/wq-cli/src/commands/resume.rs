//! Resume command implementation

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;

use crate::cli::{GlobalArgs, ResumeArgs};
use crate::commands::common::{parse_run_id, report_run};
use crate::context::RuntimeContext;

/// Execute the resume command
pub(crate) async fn execute(args: &ResumeArgs, global: &GlobalArgs) -> Result<()> {
    let run_id = parse_run_id(&args.run_id)?;
    let input = read_input(&args.input)?;

    let ctx = RuntimeContext::load(global)?;
    let engine = ctx.engine()?;
    let result = engine.resume(&run_id, &args.step_id, input).await?;

    report_run(&result, args.output)
}

/// Parse the resume payload, reading stdin when given `-`
fn read_input(raw: &str) -> Result<Value> {
    let text = if raw == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read resume input from stdin")?;
        buf
    } else {
        raw.to_string()
    };
    parse_input(&text)
}

pub(crate) fn parse_input(text: &str) -> Result<Value> {
    serde_json::from_str(text.trim()).context("Resume input is not valid JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_input() {
        let value = parse_input(" {\"approved\": true}\n").unwrap();
        assert_eq!(value, json!({"approved": true}));
    }

    #[test]
    fn test_parse_input_rejects_plain_text() {
        let err = parse_input("yes please").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }
}
