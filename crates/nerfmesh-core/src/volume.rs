//! Dense scalar volume rebuilt from flat field samples.

use crate::error::{Error, Result};
use crate::field::FieldSample;
use crate::grid::{lattice_index, lattice_len};

/// An `N x N x N` density volume stored in [`lattice_index`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityVolume {
    resolution: u32,
    values: Vec<f32>,
}

impl DensityVolume {
    /// Builds a volume from the density channel of field samples.
    pub fn assemble(resolution: u32, samples: &[FieldSample]) -> Result<Self> {
        Self::from_densities(resolution, samples.iter().map(|s| s.sigma).collect())
    }

    /// Builds a volume from raw densities, flooring negatives (and NaN) at zero.
    ///
    /// Negative density carries no meaning beyond "empty space".
    pub fn from_densities(resolution: u32, mut values: Vec<f32>) -> Result<Self> {
        let expected = match lattice_len(resolution) {
            Some(len) if resolution > 0 => len,
            _ => return Err(Error::InvalidResolution(resolution)),
        };
        if values.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        for v in &mut values {
            *v = v.max(0.0);
        }
        Ok(Self { resolution, values })
    }

    #[must_use]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Returns the flat value buffer.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Returns the density at node `(i, j, k)`.
    #[must_use]
    pub fn get(&self, i: u32, j: u32, k: u32) -> f32 {
        self.values[lattice_index(i, j, k, self.resolution)]
    }

    /// Returns the largest density in the volume.
    #[must_use]
    pub fn max_density(&self) -> f32 {
        self.values.iter().copied().fold(0.0, f32::max)
    }

    /// Returns how many nodes are strictly above `threshold`.
    #[must_use]
    pub fn count_above(&self, threshold: f32) -> usize {
        self.values.iter().filter(|&&v| v > threshold).count()
    }
}
