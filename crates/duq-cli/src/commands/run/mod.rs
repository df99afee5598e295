//! Run command implementation
//!
//! `execute` binds scheduler dispatch to materializing a model in the
//! database; this module resolves options, opens the database, and reports.

mod execute;

use anyhow::{Context, Result};
use duq_core::{FailurePolicy, NodeStatus, RunOptions, RunResult};
use duq_db::{Database, DuckDbBackend};
use std::sync::Arc;
use std::time::Instant;

use crate::cli::{GlobalArgs, OutputFormat, RunArgs};
use crate::commands::common::{load_project, materialization, plan_project, ExitCode};

use execute::{execute_models, render_statements, ExecutionContext};

/// Execute the run command
pub async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let start_time = Instant::now();
    let project = load_project(global)?;
    let json_mode = args.output == OutputFormat::Json;

    // Definition and graph errors are fatal before the database is opened.
    let (graph, order) = plan_project(&project)?;
    let mode = materialization(global, &project);
    let statements = render_statements(&project.models, mode);

    let options = RunOptions {
        concurrency: args.threads.unwrap_or(project.config.threads),
        policy: if args.fail_fast {
            FailurePolicy::FailFast
        } else {
            project.config.failure_policy()
        },
    };

    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| project.config.database.clone());
    let db: Arc<dyn Database> = Arc::new(
        DuckDbBackend::new(&db_path)
            .with_context(|| format!("Failed to open database: {}", db_path))?,
    );
    log::debug!("Connected to {} at {}", db.db_type(), db_path);

    if !json_mode {
        if args.parallel {
            println!(
                "Running {} models with up to {} at once...\n",
                order.len(),
                options.concurrency
            );
        } else {
            println!("Running {} models...\n", order.len());
        }
    }

    let ctx = ExecutionContext::new(db, statements, mode, args, order.len());
    let result = execute_models(&ctx, &graph, options, args.parallel)
        .await
        .context("Failed to schedule models")?;
    ctx.finish();

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result, start_time);
    }

    if !result.is_success() {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

fn print_summary(result: &RunResult, start_time: Instant) {
    for outcome in &result.nodes {
        if let NodeStatus::Skipped { reason } = &outcome.status {
            println!("  - {} (skipped: {})", outcome.model, reason);
        }
    }

    let summary = result.summary();
    println!();
    println!(
        "Completed: {} succeeded, {} failed, {} skipped",
        summary.succeeded, summary.failed, summary.skipped
    );
    println!("Total time: {}ms", start_time.elapsed().as_millis());
}
