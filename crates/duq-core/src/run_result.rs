//! Per-model outcomes of one run

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::model_name::ModelName;

/// How the models of a run were dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One model at a time, in topological order
    Sequential,
    /// Ready models dispatched together, bounded by a worker limit
    Concurrent,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Concurrent => write!(f, "concurrent"),
        }
    }
}

/// Final status of one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NodeStatus {
    /// Materialized
    Succeeded,
    /// The database rejected the statement
    Failed { cause: String },
    /// Never attempted
    Skipped { reason: String },
}

impl NodeStatus {
    /// Short lowercase label
    pub fn label(&self) -> &'static str {
        match self {
            NodeStatus::Succeeded => "succeeded",
            NodeStatus::Failed { .. } => "failed",
            NodeStatus::Skipped { .. } => "skipped",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Succeeded => write!(f, "succeeded"),
            NodeStatus::Failed { cause } => write!(f, "failed: {}", cause),
            NodeStatus::Skipped { reason } => write!(f, "skipped: {}", reason),
        }
    }
}

/// Outcome of one model
#[derive(Debug, Clone, Serialize)]
pub struct NodeOutcome {
    pub model: ModelName,
    #[serde(flatten)]
    pub status: NodeStatus,
    pub duration_ms: u64,
}

/// Counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Result of a whole run: one outcome per model, in topological order
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub run_id: Uuid,
    pub mode: ExecutionMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub nodes: Vec<NodeOutcome>,
}

impl RunResult {
    pub(crate) fn new(
        mode: ExecutionMode,
        started_at: DateTime<Utc>,
        nodes: Vec<NodeOutcome>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            mode,
            started_at,
            finished_at: Utc::now(),
            nodes,
        }
    }

    /// True when no model failed
    pub fn is_success(&self) -> bool {
        !self
            .nodes
            .iter()
            .any(|n| matches!(n.status, NodeStatus::Failed { .. }))
    }

    /// Outcome of a single model
    pub fn outcome(&self, model: &str) -> Option<&NodeOutcome> {
        self.nodes.iter().find(|n| n.model == model)
    }

    /// Status of a single model
    pub fn status_of(&self, model: &str) -> Option<&NodeStatus> {
        self.outcome(model).map(|n| &n.status)
    }

    /// Count models by status
    pub fn summary(&self) -> RunSummary {
        self.nodes
            .iter()
            .fold(RunSummary::default(), |mut acc, n| {
                match n.status {
                    NodeStatus::Succeeded => acc.succeeded += 1,
                    NodeStatus::Failed { .. } => acc.failed += 1,
                    NodeStatus::Skipped { .. } => acc.skipped += 1,
                }
                acc
            })
    }
}

#[cfg(test)]
#[path = "run_result_test.rs"]
mod tests;
