//! Shared helpers for CLI commands

use anyhow::{Context, Result};
use duq_core::{DependencyGraph, ModelName, Project};
use duq_sql::Materialization;
use std::fmt;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and the database connection closes.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // control flow only; main never prints it
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load the model directory named on the command line
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    Project::load(&global.sql_path).with_context(|| {
        format!(
            "Failed to load models from {}",
            global.sql_path.display()
        )
    })
}

/// Build the graph and its execution order. Fails on duplicate names and
/// cycles, before anything touches a database.
pub(crate) fn plan_project(project: &Project) -> Result<(DependencyGraph, Vec<ModelName>)> {
    let graph = project
        .graph()
        .context("Failed to build dependency graph")?;
    let order = graph
        .topological_order()
        .context("Failed to order models")?;
    Ok((graph, order))
}

/// `--views` wins over the configured materialization
pub(crate) fn materialization(global: &GlobalArgs, project: &Project) -> Materialization {
    if global.views {
        Materialization::View
    } else {
        project.config.materialization
    }
}
