//! wq - ask a data warehouse questions in natural language

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod context;
mod logging;

use cli::Cli;
use commands::{common::ExitCode, exec, introspect, resume, run, start, status};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    if let Err(err) = dispatch(&cli).await {
        if let Some(code) = err.downcast_ref::<ExitCode>() {
            std::process::exit(code.0);
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

async fn dispatch(cli: &Cli) -> Result<()> {
    match &cli.command {
        cli::Commands::Run(args) => run::execute(args, &cli.global).await,
        cli::Commands::Start(args) => start::execute(args, &cli.global).await,
        cli::Commands::Resume(args) => resume::execute(args, &cli.global).await,
        cli::Commands::Status(args) => status::execute(args, &cli.global).await,
        cli::Commands::Cancel(args) => status::cancel(args, &cli.global).await,
        cli::Commands::Introspect(args) => introspect::execute(args, &cli.global).await,
        cli::Commands::Exec(args) => exec::execute(args, &cli.global).await,
    }
}
