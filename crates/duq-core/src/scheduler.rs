//! Readiness tracking and execution of a dependency graph
//!
//! The [`Scheduler`] owns every state transition. Work for a ready model is
//! handed to a caller-supplied callback that only executes and reports; the
//! scheduler decides what becomes ready next and what gets skipped.

use chrono::Utc;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

use crate::dag::DependencyGraph;
use crate::error::{CoreError, CoreResult};
use crate::model_name::ModelName;
use crate::run_result::{ExecutionMode, NodeOutcome, NodeStatus, RunResult};

/// Default number of models materialized at the same time
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Lifecycle of one model during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Waiting on at least one dependency
    Pending,
    /// Every dependency is done
    Ready,
    /// Handed to a worker
    Running,
    /// Materialized
    Done,
    /// Materialization failed
    Failed,
    /// Never started because an upstream model failed or the run stopped
    Skipped,
}

/// What happens to the rest of the run when a model fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Skip the failed model's dependents, keep running independent branches
    #[default]
    ContainAndContinue,
    /// Start nothing new after the first failure
    FailFast,
}

/// Knobs for a run
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Upper bound on models executing at once (at least 1)
    pub concurrency: usize,
    pub policy: FailurePolicy,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            policy: FailurePolicy::default(),
        }
    }
}

struct Node {
    name: ModelName,
    state: NodeState,
    /// Dependencies not yet `Done`
    remaining: usize,
    dependents: Vec<usize>,
    status: Option<NodeStatus>,
    duration: Duration,
}

/// Per-run scheduling state over a [`DependencyGraph`]
pub struct Scheduler {
    nodes: Vec<Node>,
    index: HashMap<ModelName, usize>,
    order: Vec<usize>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let states: Vec<(&str, NodeState)> = self
            .nodes
            .iter()
            .map(|n| (n.name.as_str(), n.state))
            .collect();
        f.debug_struct("Scheduler").field("states", &states).finish()
    }
}

impl Scheduler {
    /// Prepare a run. Fails on a cyclic graph before anything is dispatched.
    pub fn new(graph: &DependencyGraph) -> CoreResult<Self> {
        let order = graph.topological_order()?;
        let inner = graph.inner();

        let mut nodes: Vec<Node> = inner
            .node_indices()
            .map(|idx| {
                let remaining = inner.neighbors_directed(idx, Direction::Incoming).count();
                let mut dependents: Vec<usize> = inner
                    .neighbors_directed(idx, Direction::Outgoing)
                    .map(|d| d.index())
                    .collect();
                dependents.sort_unstable();
                Node {
                    name: inner[idx].clone(),
                    state: NodeState::Pending,
                    remaining,
                    dependents,
                    status: None,
                    duration: Duration::ZERO,
                }
            })
            .collect();

        for node in &mut nodes {
            if node.remaining == 0 {
                node.state = NodeState::Ready;
            }
        }

        let index: HashMap<ModelName, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.name.clone(), i))
            .collect();
        let order = order.iter().map(|name| index[name.as_str()]).collect();

        Ok(Self {
            nodes,
            index,
            order,
        })
    }

    fn position(&self, name: &str) -> CoreResult<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| CoreError::ModelNotFound {
                name: name.to_string(),
            })
    }

    /// Current state of a model
    pub fn status(&self, name: &str) -> Option<NodeState> {
        self.index.get(name).map(|&i| self.nodes[i].state)
    }

    /// The ready frontier, in insertion order, without starting anything
    pub fn ready(&self) -> Vec<ModelName> {
        self.nodes
            .iter()
            .filter(|n| n.state == NodeState::Ready)
            .map(|n| n.name.clone())
            .collect()
    }

    /// Take the whole ready frontier and mark it `Running`
    pub fn take_ready(&mut self) -> Vec<ModelName> {
        self.nodes
            .iter_mut()
            .filter(|n| n.state == NodeState::Ready)
            .map(|n| {
                n.state = NodeState::Running;
                n.name.clone()
            })
            .collect()
    }

    /// Move one ready model to `Running`
    pub fn start(&mut self, name: &str) -> CoreResult<()> {
        let i = self.position(name)?;
        debug_assert_eq!(self.nodes[i].state, NodeState::Ready, "{} is not ready", name);
        self.nodes[i].state = NodeState::Running;
        Ok(())
    }

    /// Record a success and release dependents whose last dependency this was
    pub fn mark_done(&mut self, name: &str, duration: Duration) -> CoreResult<()> {
        let i = self.position(name)?;
        let node = &mut self.nodes[i];
        node.state = NodeState::Done;
        node.status = Some(NodeStatus::Succeeded);
        node.duration = duration;

        for d in node.dependents.clone() {
            let dependent = &mut self.nodes[d];
            dependent.remaining -= 1;
            if dependent.remaining == 0 && dependent.state == NodeState::Pending {
                dependent.state = NodeState::Ready;
                log::debug!("'{}' is ready", dependent.name);
            }
        }
        Ok(())
    }

    /// Record a failure and skip every transitive dependent
    pub fn mark_failed(
        &mut self,
        name: &str,
        cause: impl Into<String>,
        duration: Duration,
    ) -> CoreResult<()> {
        let i = self.position(name)?;
        let node = &mut self.nodes[i];
        node.state = NodeState::Failed;
        node.status = Some(NodeStatus::Failed {
            cause: cause.into(),
        });
        node.duration = duration;

        let reason = format!("upstream model '{}' failed", name);
        let mut stack = self.nodes[i].dependents.clone();
        while let Some(d) = stack.pop() {
            let dependent = &mut self.nodes[d];
            if matches!(dependent.state, NodeState::Pending | NodeState::Ready) {
                dependent.state = NodeState::Skipped;
                dependent.status = Some(NodeStatus::Skipped {
                    reason: reason.clone(),
                });
                log::debug!("'{}' skipped: {}", dependent.name, reason);
                stack.extend(dependent.dependents.iter().copied());
            }
        }
        Ok(())
    }

    /// Skip every model that has not started yet
    pub fn skip_remaining(&mut self, reason: &str) {
        for node in &mut self.nodes {
            if matches!(node.state, NodeState::Pending | NodeState::Ready) {
                node.state = NodeState::Skipped;
                node.status = Some(NodeStatus::Skipped {
                    reason: reason.to_string(),
                });
            }
        }
    }

    /// True while any model is still pending, ready or running
    pub fn is_active(&self) -> bool {
        self.nodes.iter().any(|n| {
            matches!(
                n.state,
                NodeState::Pending | NodeState::Ready | NodeState::Running
            )
        })
    }

    /// Model names in the static topological order
    pub fn order(&self) -> Vec<ModelName> {
        self.order
            .iter()
            .map(|&i| self.nodes[i].name.clone())
            .collect()
    }

    /// Collect outcomes in topological order
    pub fn into_result(
        self,
        mode: ExecutionMode,
        started_at: chrono::DateTime<Utc>,
    ) -> RunResult {
        let Self {
            mut nodes, order, ..
        } = self;
        let outcomes = order
            .into_iter()
            .map(|i| {
                let node = &mut nodes[i];
                NodeOutcome {
                    model: node.name.clone(),
                    status: node.status.take().unwrap_or_else(|| NodeStatus::Skipped {
                        reason: "never scheduled".to_string(),
                    }),
                    duration_ms: node.duration.as_millis() as u64,
                }
            })
            .collect();
        RunResult::new(mode, started_at, outcomes)
    }

    /// Run the graph with bounded concurrency.
    ///
    /// Works in rounds: take the ready frontier, dispatch all of it (at most
    /// `options.concurrency` executing at once), wait for the whole batch,
    /// record each outcome, repeat. A model is never dispatched before all of
    /// its dependencies are done.
    pub async fn run<F, Fut, E>(
        graph: &DependencyGraph,
        options: RunOptions,
        on_ready: F,
    ) -> CoreResult<RunResult>
    where
        F: Fn(ModelName) -> Fut,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let mut scheduler = Self::new(graph)?;
        let started_at = Utc::now();
        let permits = Arc::new(Semaphore::new(options.concurrency.max(1)));
        let mut round = 0usize;

        while scheduler.is_active() {
            let batch = scheduler.take_ready();
            if batch.is_empty() {
                break;
            }
            round += 1;
            log::info!("Round {}: dispatching {} model(s)", round, batch.len());

            let mut handles = Vec::with_capacity(batch.len());
            for name in batch {
                let work = on_ready(name.clone());
                let permits = Arc::clone(&permits);
                let handle = tokio::spawn(async move {
                    let Ok(_permit) = permits.acquire().await else {
                        return (Err("worker pool closed".to_string()), Duration::ZERO);
                    };
                    let started = Instant::now();
                    let outcome = work.await.map_err(|e| e.to_string());
                    (outcome, started.elapsed())
                });
                handles.push((name, handle));
            }

            let mut round_failed = false;
            for (name, handle) in handles {
                match handle.await {
                    Ok((Ok(()), elapsed)) => scheduler.mark_done(&name, elapsed)?,
                    Ok((Err(cause), elapsed)) => {
                        round_failed = true;
                        scheduler.mark_failed(&name, cause, elapsed)?;
                    }
                    Err(join_err) => {
                        round_failed = true;
                        scheduler.mark_failed(
                            &name,
                            format!("worker task failed: {}", join_err),
                            Duration::ZERO,
                        )?;
                    }
                }
            }

            if round_failed && options.policy == FailurePolicy::FailFast {
                scheduler.skip_remaining("run stopped after a failure (fail-fast)");
            }
        }

        Ok(scheduler.into_result(ExecutionMode::Concurrent, started_at))
    }

    /// Run the graph one model at a time in topological order.
    ///
    /// `options.concurrency` is ignored.
    pub async fn run_sequential<F, Fut, E>(
        graph: &DependencyGraph,
        options: RunOptions,
        mut on_ready: F,
    ) -> CoreResult<RunResult>
    where
        F: FnMut(ModelName) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: fmt::Display,
    {
        let mut scheduler = Self::new(graph)?;
        let started_at = Utc::now();

        for name in scheduler.order() {
            // dependencies come earlier in the order, so anything not ready
            // here was skipped
            if scheduler.status(&name) != Some(NodeState::Ready) {
                continue;
            }
            scheduler.start(&name)?;
            let started = Instant::now();
            match on_ready(name.clone()).await {
                Ok(()) => scheduler.mark_done(&name, started.elapsed())?,
                Err(e) => {
                    scheduler.mark_failed(&name, e.to_string(), started.elapsed())?;
                    if options.policy == FailurePolicy::FailFast {
                        scheduler.skip_remaining("run stopped after a failure (fail-fast)");
                        break;
                    }
                }
            }
        }

        Ok(scheduler.into_result(ExecutionMode::Sequential, started_at))
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;
