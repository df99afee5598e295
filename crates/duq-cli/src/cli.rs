//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// duq - build a dependency graph from SQL models and materialize it in DuckDB
#[derive(Parser, Debug)]
#[command(name = "duq")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Directory containing the model files
    pub sql_path: PathBuf,

    /// Materialize models as views instead of tables
    #[arg(short = 'v', long, global = true)]
    pub views: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the execution order, one model per line
    Plan(PlanArgs),

    /// Print the SQL script that materializes every model in order
    Script,

    /// Materialize every model in a DuckDB database
    Run(RunArgs),
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// DuckDB database file, or `:memory:` (default: `database` from duq.yml)
    pub db_path: Option<String>,

    /// Materialize independent models concurrently
    #[arg(short, long)]
    pub parallel: bool,

    /// Maximum models materialized at once (default: `threads` from duq.yml)
    #[arg(short, long, requires = "parallel", value_parser = parse_threads)]
    pub threads: Option<usize>,

    /// Start no new model after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Suppress the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

fn parse_threads(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
