//! Configuration for a mesh extraction run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::field::{
    BatchedEvaluator, Embedding, DEFAULT_CHUNK_SIZE, DEFAULT_DIR_FREQS, DEFAULT_XYZ_FREQS,
};
use crate::grid::{lattice_len, BoundingBox, GridSpec};

/// Everything one extraction run needs.
///
/// Tune `bounds` until the object sits tightly inside it with little noise,
/// using a small `resolution`; raise the resolution for the final mesh.
/// Lower `density_threshold` keeps more noise, higher may drop thin parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Folder holding the training images. Informational only.
    pub dataset_root: PathBuf,

    /// Radiance-field checkpoint to load.
    pub checkpoint: PathBuf,

    /// Full resolution of the training images, `[width, height]`. Informational only.
    pub image_size: [u32; 2],

    /// Name of the scene; the mesh is written to `<scene_name>.dae`.
    pub scene_name: String,

    /// Sampled region. All three axes should have the same extent.
    pub bounds: BoundingBox,

    /// Nodes per axis.
    pub resolution: u32,

    /// Maximum number of points per model call.
    pub chunk_size: usize,

    /// Density level the surface is extracted at.
    pub density_threshold: f32,

    /// Directory the mesh file is written to.
    pub output_dir: PathBuf,

    /// Frequency bands of the position encoding.
    pub xyz_freqs: u32,

    /// Frequency bands of the direction encoding.
    pub dir_freqs: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            dataset_root: PathBuf::from("../dataset"),
            checkpoint: PathBuf::from("epoch=17.ckpt"),
            image_size: [4032, 3024],
            scene_name: "chair".to_string(),
            bounds: BoundingBox::default(),
            resolution: 512,
            chunk_size: DEFAULT_CHUNK_SIZE,
            density_threshold: 7.0,
            output_dir: PathBuf::from("."),
            xyz_freqs: DEFAULT_XYZ_FREQS,
            dir_freqs: DEFAULT_DIR_FREQS,
        }
    }
}

impl ExtractionConfig {
    /// Loads a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Serializes the configuration as pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every value the pipeline depends on.
    pub fn validate(&self) -> Result<()> {
        if self.resolution == 0 || lattice_len(self.resolution).is_none() {
            return Err(Error::InvalidResolution(self.resolution));
        }
        if self.chunk_size == 0 {
            return Err(Error::invalid_config("chunk_size must be at least 1"));
        }
        if self.scene_name.trim().is_empty() {
            return Err(Error::invalid_config("scene_name must not be empty"));
        }
        if !self.density_threshold.is_finite() {
            return Err(Error::invalid_config(format!(
                "density_threshold must be finite, got {}",
                self.density_threshold
            )));
        }
        if !self.bounds.is_valid() {
            return Err(Error::invalid_config(format!(
                "bounds must be finite with min <= max, got {:?}",
                self.bounds
            )));
        }
        if self.image_size.contains(&0) {
            return Err(Error::invalid_config(format!(
                "image_size must be non-zero, got {:?}",
                self.image_size
            )));
        }
        Ok(())
    }

    /// Returns the sampling lattice.
    pub fn grid(&self) -> Result<GridSpec> {
        GridSpec::new(self.bounds, self.resolution)
    }

    /// Returns the chunked evaluator with this run's encodings.
    pub fn evaluator(&self) -> Result<BatchedEvaluator> {
        Ok(BatchedEvaluator::new(self.chunk_size)?
            .with_embeddings(Embedding::new(self.xyz_freqs), Embedding::new(self.dir_freqs)))
    }

    /// Returns `<output_dir>/<scene_name>.dae`.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.dae", self.scene_name))
    }
}
