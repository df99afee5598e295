//! Configuration types and parsing for duq.yml

use duq_sql::Materialization;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::scheduler::{FailurePolicy, RunOptions, DEFAULT_CONCURRENCY};

/// Configuration file looked up in the model directory
pub const CONFIG_FILE: &str = "duq.yml";

/// Optional project configuration from duq.yml.
///
/// Every key has a default, so a missing file and an empty file behave the
/// same. Command-line flags override these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// File extensions treated as model files, without the leading dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// How models are persisted
    #[serde(default)]
    pub materialization: Materialization,

    /// Models materialized at once in parallel runs
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Database path used when none is given on the command line
    #[serde(default = "default_database")]
    pub database: String,

    /// Stop dispatching after the first failure
    #[serde(default)]
    pub fail_fast: bool,
}

fn default_extensions() -> Vec<String> {
    vec!["sql".to_string()]
}

fn default_threads() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_database() -> String {
    ":memory:".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            materialization: Materialization::default(),
            threads: default_threads(),
            database: default_database(),
            fail_fast: false,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, path)
    }

    /// Load `duq.yml` from a model directory, falling back to defaults when
    /// the file does not exist
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            log::debug!("Loading config from {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    fn parse(content: &str, path: &Path) -> CoreResult<Self> {
        // an empty document deserializes as null, not as an empty mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config =
            serde_yaml::from_str(content).map_err(|e| CoreError::ConfigParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.threads == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "threads must be at least 1".to_string(),
            });
        }

        if self.extensions.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "extensions must list at least one file extension".to_string(),
            });
        }

        if let Some(bad) = self
            .extensions
            .iter()
            .find(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(CoreError::ConfigInvalid {
                message: format!("extension '{}' must be non-empty and have no leading dot", bad),
            });
        }

        Ok(())
    }

    /// Failure policy implied by `fail_fast`
    pub fn failure_policy(&self) -> FailurePolicy {
        if self.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::ContainAndContinue
        }
    }

    /// Scheduler options for this configuration
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            concurrency: self.threads,
            policy: self.failure_policy(),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
