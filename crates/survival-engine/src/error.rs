//! Engine error types.

use survival_common::WorldError;
use thiserror::Error;

/// Errors reading or writing the engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for [`crate::config::EngineConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level engine error.
#[derive(Debug, Error)]
pub enum SurvivalError {
    /// World setup failed.
    #[error("World error: {0}")]
    World(#[from] WorldError),

    /// Configuration failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A worker thread could not be started.
    #[error("Failed to spawn {name} thread: {source}")]
    Spawn {
        /// Thread name
        name: &'static str,
        /// Underlying error
        source: std::io::Error,
    },

    /// A worker thread panicked.
    #[error("{0} thread panicked")]
    WorkerPanicked(&'static str),
}

/// Result type for engine operations.
pub type SurvivalResult<T> = Result<T, SurvivalError>;
