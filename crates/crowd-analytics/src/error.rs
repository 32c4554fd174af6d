use thiserror::Error;

/// Configuration problems, reported once when the engine is built
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("environment variable {name} has invalid value '{value}'")]
    Env { name: String, value: String },
}

impl From<anyhow::Error> for ConfigError {
    fn from(err: anyhow::Error) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}

/// Failures of the caller-owned report store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("report store lock poisoned: {0}")]
    Lock(String),

    #[error("analysis {0} not found")]
    NotFound(String),
}
