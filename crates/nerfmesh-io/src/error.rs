//! Error types for mesh export.

use thiserror::Error;

/// Result type for mesh export operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while writing a mesh.
#[derive(Debug, Error)]
pub enum IoError {
    /// Unknown file format (unrecognized or missing extension).
    #[error("unknown mesh format: .{extension}")]
    UnknownFormat {
        /// The unrecognized extension.
        extension: String,
    },

    /// The encoder rejected the content.
    #[error("invalid mesh content: {message}")]
    InvalidContent {
        /// Description of what went wrong.
        message: String,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }
}

impl From<IoError> for nerfmesh_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => Self::Io(e),
            other => Self::Mesh(other.to_string()),
        }
    }
}
