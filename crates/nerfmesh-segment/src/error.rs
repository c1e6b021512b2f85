//! Error types for background removal.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while segmenting and compositing images.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Mask and image dimensions disagree.
    #[error("mask is {actual:?} but image is {expected:?}")]
    MaskSize {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Mask data does not fill its declared dimensions.
    #[error("mask data has {actual} values, expected {expected}")]
    MaskData { expected: usize, actual: usize },

    /// The instance predictor failed.
    #[error("prediction failed for {stem}: {message}")]
    Predictor { stem: String, message: String },

    /// Masks would be exported into the directory the predictor reads from.
    #[error("refusing to export masks into the predictor's input directory {}", .0.display())]
    MaskExportConflict(PathBuf),

    /// Input path has no usable file stem.
    #[error("cannot derive an output name from {}", .0.display())]
    NoStem(PathBuf),

    /// Image decoding or encoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for background removal.
pub type Result<T> = std::result::Result<T, SegmentError>;
