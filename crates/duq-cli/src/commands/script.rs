//! Script command: print the materialization script

use anyhow::Result;
use duq_core::render_script;

use crate::cli::GlobalArgs;
use crate::commands::common::{load_project, materialization, plan_project};

/// Execute the script command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let (_, order) = plan_project(&project)?;

    print!(
        "{}",
        render_script(&order, &project.models, materialization(global, &project))
    );
    Ok(())
}
