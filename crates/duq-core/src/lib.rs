//! duq-core - Core library for duq
//!
//! This crate turns SQL model files into an executable pipeline: model
//! descriptors, project discovery and configuration, the dependency graph, the
//! scheduler that runs it, and the script emitter.

pub mod config;
pub mod dag;
pub mod error;
pub mod model;
pub mod model_name;
pub mod project;
pub mod run_result;
pub mod scheduler;
pub mod script;

pub use config::{Config, CONFIG_FILE};
pub use dag::DependencyGraph;
pub use error::{CoreError, CoreResult};
pub use model::SqlModel;
pub use model_name::ModelName;
pub use project::{discover_model_files, Project};
pub use run_result::{ExecutionMode, NodeOutcome, NodeStatus, RunResult, RunSummary};
pub use scheduler::{FailurePolicy, NodeState, RunOptions, Scheduler, DEFAULT_CONCURRENCY};
pub use script::render_script;
