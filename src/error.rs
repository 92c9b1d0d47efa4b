//! Error types shared across the crate.

use thiserror::Error;

/// Failures from maze generation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MazeError {
    #[error("maze of {width}x{height} cells is too small, both sides must be at least {min}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        min: usize,
    },
    #[error("difficulty level must be at least 1")]
    InvalidLevel,
}

/// Failures loading or validating a [`GameConfig`](crate::config::GameConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse game config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid game config: {0}")]
    Invalid(String),
}

/// Failures writing persisted state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("key-value storage is not available")]
    Unavailable,
    #[error("failed to write key `{key}`")]
    Write { key: String },
    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}
