//! Procedural radiance field made of Gaussian blobs.
//!
//! Stands in for a trained network: the checkpoint is a JSON list of blobs,
//! and density at a point is the sum of their Gaussian falloffs.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::field::{EncodedBatch, FieldSample, RadianceField};

/// One isotropic Gaussian density blob.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub center: Vec3,
    /// Standard deviation of the falloff.
    pub radius: f32,
    /// Peak density at the center.
    pub density: f32,
    #[serde(default = "default_color")]
    pub color: [f32; 3],
}

fn default_color() -> [f32; 3] {
    [0.5, 0.5, 0.5]
}

impl Blob {
    /// Density contributed at `p`.
    #[must_use]
    pub fn density_at(&self, p: Vec3) -> f32 {
        let r = self.radius.max(f32::EPSILON);
        self.density * (-(p - self.center).length_squared() / (2.0 * r * r)).exp()
    }
}

/// On-disk form of a blob field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldCheckpoint {
    pub blobs: Vec<Blob>,
}

impl FieldCheckpoint {
    /// Reads a checkpoint, failing with [`Error::CheckpointNotFound`] if the file is missing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::CheckpointNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        let checkpoint: Self = serde_json::from_str(&text)?;
        log::info!(
            "Loaded checkpoint {} with {} blob(s)",
            path.display(),
            checkpoint.blobs.len()
        );
        Ok(checkpoint)
    }

    /// Writes the checkpoint as JSON, overwriting any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// A [`RadianceField`] summing Gaussian blobs.
///
/// Reads raw positions from the identity channels of each encoded row and
/// ignores the viewing direction.
#[derive(Debug, Clone, Default)]
pub struct BlobField {
    blobs: Vec<Blob>,
}

impl BlobField {
    pub fn new(blobs: Vec<Blob>) -> Self {
        Self { blobs }
    }

    #[must_use]
    pub fn blobs(&self) -> &[Blob] {
        &self.blobs
    }

    /// Evaluates colour and density at a raw position.
    #[must_use]
    pub fn sample(&self, p: Vec3) -> FieldSample {
        let mut sigma = 0.0;
        let mut rgb = Vec3::ZERO;
        for blob in &self.blobs {
            let d = blob.density_at(p);
            sigma += d;
            rgb += Vec3::from_array(blob.color) * d;
        }
        if sigma > 0.0 {
            rgb /= sigma;
        }
        FieldSample::new(rgb.to_array(), sigma)
    }
}

impl From<FieldCheckpoint> for BlobField {
    fn from(checkpoint: FieldCheckpoint) -> Self {
        Self::new(checkpoint.blobs)
    }
}

impl RadianceField for BlobField {
    fn evaluate(&self, batch: &EncodedBatch) -> Result<Vec<FieldSample>> {
        Ok((0..batch.len())
            .map(|row| self.sample(batch.position(row)))
            .collect())
    }
}
