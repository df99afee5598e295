//! Model execution: bind scheduler dispatch to materialization.

use anyhow::{anyhow, Result};
use duq_core::{
    CoreResult, DependencyGraph, ModelName, RunOptions, RunResult, Scheduler, SqlModel,
};
use duq_db::Database;
use duq_sql::Materialization;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::cli::{OutputFormat, RunArgs};

/// Everything a dispatched model needs. Cheap to clone: one clone moves into
/// each model's task.
#[derive(Clone)]
pub(super) struct ExecutionContext {
    pub(super) db: Arc<dyn Database>,
    pub(super) statements: Arc<HashMap<ModelName, String>>,
    pub(super) materialization: Materialization,
    pub(super) progress: Option<ProgressBar>,
    pub(super) quiet_lines: bool,
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("materialization", &self.materialization)
            .field("statements", &self.statements.len())
            .finish_non_exhaustive()
    }
}

impl ExecutionContext {
    pub(super) fn new(
        db: Arc<dyn Database>,
        statements: HashMap<ModelName, String>,
        materialization: Materialization,
        args: &RunArgs,
        model_count: usize,
    ) -> Self {
        let text_mode = args.output == OutputFormat::Text;
        let progress = (text_mode && !args.quiet).then(|| {
            let pb = ProgressBar::new(model_count as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        });

        Self {
            db,
            statements: Arc::new(statements),
            materialization,
            progress,
            quiet_lines: !text_mode,
        }
    }

    /// Print one per-model line above the progress bar
    fn report(&self, line: String) {
        if self.quiet_lines {
            return;
        }
        match &self.progress {
            Some(pb) => pb.println(line),
            None => println!("{}", line),
        }
    }

    /// Clear the progress bar once the run is over
    pub(super) fn finish(&self) {
        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }
    }
}

/// Render every model's materialization statement up front, so a dispatched
/// task only executes.
pub(super) fn render_statements(
    models: &[SqlModel],
    mode: Materialization,
) -> HashMap<ModelName, String> {
    models
        .iter()
        .map(|m| (m.name.clone(), m.materialization_sql(mode)))
        .collect()
}

/// Materialize one model and print its outcome line.
///
/// Reports only; the scheduler records the outcome and decides what runs
/// next.
async fn materialize_model(ctx: ExecutionContext, name: ModelName) -> Result<()> {
    let sql = ctx
        .statements
        .get(&name)
        .ok_or_else(|| anyhow!("no statement rendered for model '{}'", name))?;

    log::debug!("Materializing '{}'", name);
    let started = Instant::now();
    let result = ctx.db.execute_batch(sql).await;
    let elapsed = started.elapsed().as_millis();

    if let Some(pb) = &ctx.progress {
        pb.inc(1);
        pb.set_message(name.to_string());
    }

    match result {
        Ok(()) => {
            ctx.report(format!(
                "  \u{2713} {} ({}) [{}ms]",
                name, ctx.materialization, elapsed
            ));
            Ok(())
        }
        Err(e) => {
            ctx.report(format!("  \u{2717} {} - {} [{}ms]", name, e, elapsed));
            Err(e.into())
        }
    }
}

/// Run every model through the scheduler, concurrently or one at a time
pub(super) async fn execute_models(
    ctx: &ExecutionContext,
    graph: &DependencyGraph,
    options: RunOptions,
    parallel: bool,
) -> CoreResult<RunResult> {
    if parallel {
        Scheduler::run(graph, options, |name| materialize_model(ctx.clone(), name)).await
    } else {
        Scheduler::run_sequential(graph, options, |name| materialize_model(ctx.clone(), name))
            .await
    }
}

#[cfg(test)]
#[path = "execute_test.rs"]
mod tests;
