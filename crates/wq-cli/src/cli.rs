//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// wq - ask a data warehouse questions in natural language
#[derive(Parser, Debug)]
#[command(name = "wq")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding wq.yml; relative state paths resolve against it
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the DuckDB database path
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Override the default project for datasets that name none
    #[arg(long, global = true, env = "WQ_DEFAULT_PROJECT")]
    pub default_project: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the query pipeline interactively, answering each prompt on stdin
    Run(RunArgs),

    /// Start a pipeline run and print where it suspends
    Start(StartArgs),

    /// Answer a suspended run and continue it
    Resume(ResumeArgs),

    /// Show the state of a run
    Status(RunRefArgs),

    /// Mark an unfinished run as failed
    Cancel(RunRefArgs),

    /// Introspect one dataset and print its schema
    Introspect(IntrospectArgs),

    /// Execute a single SELECT statement
    Exec(ExecArgs),
}

/// Output formats for run results
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON
    Json,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Id for the new run (default: random)
    #[arg(long)]
    pub run_id: Option<String>,

    /// Continue an existing suspended run instead of starting one
    #[arg(long, conflicts_with = "run_id")]
    pub attach: Option<String>,
}

/// Arguments for the start command
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Id for the new run (default: random)
    #[arg(long)]
    pub run_id: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the resume command
#[derive(Args, Debug)]
pub struct ResumeArgs {
    /// Run to resume
    pub run_id: String,

    /// Step the run is suspended at
    pub step_id: String,

    /// Resume input as JSON, or `-` to read it from stdin
    pub input: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments naming an existing run
#[derive(Args, Debug)]
pub struct RunRefArgs {
    /// Run id
    pub run_id: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Schema output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    /// Markdown overview
    Markdown,
    /// Compact description used in generator prompts
    Prompt,
    /// The unified schema document as JSON
    Json,
}

/// Arguments for the introspect command
#[derive(Args, Debug)]
pub struct IntrospectArgs {
    /// Dataset name or `project.dataset` reference
    pub dataset: String,

    /// Project owning the dataset
    #[arg(long)]
    pub project: Option<String>,

    /// Tables to include (comma-separated, default: all)
    #[arg(short, long)]
    pub tables: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "markdown")]
    pub output: SchemaFormat,
}

/// Arguments for the exec command
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// SELECT statement to execute
    pub sql: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
