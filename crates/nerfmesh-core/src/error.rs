//! Error types for nerfmesh.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for nerfmesh-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Grid resolution must be at least one node per axis.
    #[error("invalid grid resolution {0}: must be positive")]
    InvalidResolution(u32),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// The radiance field failed while evaluating a chunk.
    #[error("field evaluation failed on chunk {chunk}: {message}")]
    ModelFailure { chunk: usize, message: String },

    /// The checkpoint file does not exist.
    #[error("checkpoint not found: {}", .0.display())]
    CheckpointNotFound(PathBuf),

    /// Mesh serialization failed.
    #[error("mesh export error: {0}")]
    Mesh(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates an `InvalidConfig` error with the given message.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// A specialized Result type for nerfmesh-core operations.
pub type Result<T> = std::result::Result<T, Error>;
