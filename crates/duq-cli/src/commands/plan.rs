//! Plan command: print the execution order

use anyhow::Result;
use serde::Serialize;

use crate::cli::{GlobalArgs, OutputFormat, PlanArgs};
use crate::commands::common::{load_project, plan_project};

/// One model in JSON plan output
#[derive(Debug, Serialize)]
struct PlanEntry<'a> {
    model: &'a str,
    depends_on: Vec<String>,
    source: bool,
    origin: String,
}

/// Execute the plan command
pub async fn execute(args: &PlanArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let (graph, order) = plan_project(&project)?;

    match args.output {
        OutputFormat::Text => {
            for name in &order {
                println!("{}", name);
            }
        }
        OutputFormat::Json => {
            let entries: Vec<PlanEntry> = order
                .iter()
                .filter_map(|name| project.get_model(name))
                .map(|model| PlanEntry {
                    model: model.name.as_str(),
                    depends_on: graph
                        .dependencies(&model.name)
                        .into_iter()
                        .map(String::from)
                        .collect(),
                    source: model.is_source_model(),
                    origin: model.origin_display(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }

    Ok(())
}
