//! Model directory discovery and loading

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::dag::DependencyGraph;
use crate::error::{CoreError, CoreResult};
use crate::model::SqlModel;

/// A directory of model files plus its configuration
#[derive(Debug)]
pub struct Project {
    /// Model directory
    pub root: PathBuf,

    /// Configuration from duq.yml, or defaults
    pub config: Config,

    /// Models in discovery order (sorted by path)
    pub models: Vec<SqlModel>,
}

impl Project {
    /// Load a model directory, reading `duq.yml` from it when present
    pub fn load(root: &Path) -> CoreResult<Self> {
        ensure_dir(root)?;
        let config = Config::load_from_dir(root)?;
        Self::load_with_config(root, config)
    }

    /// Load a model directory with an already-resolved configuration
    pub fn load_with_config(root: &Path, config: Config) -> CoreResult<Self> {
        ensure_dir(root)?;
        config.validate()?;

        let files = discover_model_files(root, &config.extensions)?;
        let models = files
            .iter()
            .map(|path| SqlModel::from_file(path))
            .collect::<CoreResult<Vec<_>>>()?;

        log::info!("Loaded {} model(s) from {}", models.len(), root.display());

        Ok(Self {
            root: root.to_path_buf(),
            config,
            models,
        })
    }

    /// Build the dependency graph over every model
    pub fn graph(&self) -> CoreResult<DependencyGraph> {
        DependencyGraph::build(&self.models)
    }

    /// Get a model by name
    pub fn get_model(&self, name: &str) -> Option<&SqlModel> {
        self.models.iter().find(|m| m.name == name)
    }

    /// All model names in discovery order
    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }
}

fn ensure_dir(root: &Path) -> CoreResult<()> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(CoreError::ProjectNotFound {
            path: root.display().to_string(),
        })
    }
}

/// Recursively collect files under `root` whose extension matches one of
/// `extensions` (case-insensitive), sorted by path.
///
/// Hidden entries are ignored. Unreadable subdirectories are logged and
/// skipped; an unreadable root is an error.
pub fn discover_model_files(root: &Path, extensions: &[String]) -> CoreResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(root).map_err(|e| CoreError::IoWithPath {
        path: root.display().to_string(),
        source: e,
    })?;

    let mut files = Vec::new();
    collect_files(entries, extensions, &mut files);
    files.sort();
    Ok(files)
}

fn collect_files(entries: std::fs::ReadDir, extensions: &[String], files: &mut Vec<PathBuf>) {
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if is_hidden(&path) {
            continue;
        }

        if path.is_dir() {
            match std::fs::read_dir(&path) {
                Ok(children) => collect_files(children, extensions, files),
                Err(e) => log::warn!("Cannot read {}: {}", path.display(), e),
            }
        } else if has_model_extension(&path, extensions) {
            log::debug!("Discovered model file {}", path.display());
            files.push(path);
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

fn has_model_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
