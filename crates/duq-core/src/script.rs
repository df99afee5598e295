//! Script emission: every model's materialization statement in run order

use duq_sql::Materialization;
use std::collections::HashMap;

use crate::model::SqlModel;
use crate::model_name::ModelName;

/// Render one materialization statement per model, following `order`.
///
/// Each entry carries `-- model:` and `-- origin:` header lines, the statement
/// terminated with `;`, and a trailing blank line. Output depends only on the
/// inputs.
///
/// # Panics
///
/// Panics if a name in `order` has no model in `models`.
pub fn render_script(order: &[ModelName], models: &[SqlModel], mode: Materialization) -> String {
    let by_name: HashMap<&str, &SqlModel> = models.iter().map(|m| (m.name.as_str(), m)).collect();

    let mut script = String::new();
    for name in order {
        let Some(model) = by_name.get(name.as_str()) else {
            panic!("no model named '{}' to render", name);
        };
        script.push_str(&format!(
            "-- model: {}\n-- origin: {}\n{};\n\n",
            model.name,
            model.origin_display(),
            model.materialization_sql(mode)
        ));
    }
    script
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
