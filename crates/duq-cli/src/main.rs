//! duq CLI - build and run a DAG of SQL models against DuckDB

use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{plan, run, script};

/// Install the logger. `-v` lowers the default filter to debug; `RUST_LOG`
/// still takes precedence.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        cli::Commands::Plan(args) => plan::execute(args, &cli.global).await,
        cli::Commands::Script => script::execute(&cli.global).await,
        cli::Commands::Run(args) => run::execute(args, &cli.global).await,
    };

    if let Err(err) = result {
        let code = match err.downcast_ref::<ExitCode>() {
            Some(exit) => exit.0,
            None => {
                eprintln!("Error: {:#}", err);
                1
            }
        };
        std::process::exit(code);
    }
}
