//! Error types for duq-core

use duq_sql::SqlError;
use thiserror::Error;

/// Core error type for duq
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: A model file is not a valid model definition
    #[error("[E001] Invalid model definition in {origin}: {source}")]
    ModelDefinition {
        origin: String,
        #[source]
        source: SqlError,
    },

    /// E002: No INTO target and no file name to derive a model name from
    #[error("[E002] Cannot derive a model name for {origin}")]
    UnnamedModel { origin: String },

    /// E003: Two models share a name
    #[error("[E003] Duplicate model name '{name}' in {first} and {second}")]
    DuplicateModel {
        name: String,
        first: String,
        second: String,
    },

    /// E004: Circular dependency detected
    #[error("[E004] Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// E005: Model not found
    #[error("[E005] Model not found: {name}")]
    ModelNotFound { name: String },

    /// E006: Failed to parse configuration file
    #[error("[E006] Failed to parse config {path}: {message}")]
    ConfigParseError { path: String, message: String },

    /// E007: Model directory not found
    #[error("[E007] Model directory not found: {path}")]
    ProjectNotFound { path: String },

    /// E008: IO error with file path context
    #[error("[E008] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E009: Invalid configuration value
    #[error("[E009] Invalid config: {message}")]
    ConfigInvalid { message: String },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
