//! Error types for wq-core

use thiserror::Error;

/// Core error type for the warehouse query assistant
#[derive(Error, Debug)]
pub enum CoreError {
    /// W001: A `project.dataset` reference or project id could not be parsed
    #[error("[W001] Malformed reference '{input}': {reason}")]
    MalformedReference { input: String, reason: String },

    /// W002: An identifier failed the safe-identifier check
    #[error("[W002] Unsafe {kind} name '{name}': only letters, digits and underscores are allowed")]
    UnsafeIdentifier { kind: &'static str, name: String },

    /// W003: No project could be resolved for a dataset
    #[error("[W003] No default project configured and dataset '{dataset}' names no project")]
    MissingDefaultProject { dataset: String },

    /// W004: Required environment variable is not set
    #[error("[W004] Missing required environment variable: {name}")]
    MissingEnvVar { name: String },

    /// W005: Configuration file not found
    #[error("[W005] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// W006: Invalid configuration value
    #[error("[W006] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// W007: IO error with file path context
    #[error("[W007] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// W008: IO error
    #[error("[W008] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// W009: YAML parse error
    #[error("[W009] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
