//! Error types for loopviz.

use thiserror::Error;

/// Result type alias for fallible loopviz operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while loading `loopviz.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid duration for `{field}`: {value:?}")]
    InvalidDuration { field: &'static str, value: String },

    #[error("duplicate scenario name: {0}")]
    DuplicateScenario(String),

    #[error("scenario name must not be empty")]
    EmptyScenarioName,
}

/// Errors at the edges of the simulation (operator input, configuration).
///
/// The scheduler itself never fails; these only come from resolving
/// names and files into values it can run.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
