//! Error types for Tiny Survival World.

use thiserror::Error;

/// World and chunk errors.
#[derive(Debug, Error)]
pub enum WorldError {
    /// Chunk key could not be parsed
    #[error("Invalid chunk key: {0:?}")]
    InvalidChunkKey(String),

    /// Chunk size outside the supported range
    #[error("Invalid chunk size {size}: must be between 1 and {max}")]
    InvalidChunkSize {
        /// Requested size
        size: u32,
        /// Largest supported size
        max: u32,
    },
}

/// Result type alias for world operations.
pub type WorldResult<T> = Result<T, WorldError>;
