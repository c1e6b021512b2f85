//! Regular sampling lattice over an axis-aligned bounding box.
//!
//! Every flat index in nerfmesh goes through [`lattice_index`]: the sampler
//! emits points in that order, the density assembler reads values back in
//! that order, and marching cubes walks the field with the same layout.
//! Node `(i, j, k)` maps to x, y, z respectively and `k` varies fastest.

use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Converts lattice coordinates to a flat index.
/// Layout: `(i * n + j) * n + k`
#[inline]
#[must_use]
pub fn lattice_index(i: u32, j: u32, k: u32, n: u32) -> usize {
    let n = n as usize;
    ((i as usize) * n + (j as usize)) * n + (k as usize)
}

/// Inverse of [`lattice_index`].
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn lattice_coords(flat: usize, n: u32) -> UVec3 {
    let n = n as usize;
    let k = flat % n;
    let j = (flat / n) % n;
    let i = flat / (n * n);
    UVec3::new(i as u32, j as u32, k as u32)
}

/// Number of nodes in an `n^3` lattice, or `None` if it does not fit in `usize`.
#[must_use]
pub fn lattice_len(n: u32) -> Option<usize> {
    usize::try_from(n).ok()?.checked_pow(3)
}

/// `n` evenly spaced samples from `start` to `stop`, both inclusive.
#[must_use]
pub fn linspace(start: f32, stop: f32, n: u32) -> Vec<f32> {
    (0..n).map(|i| linspace_at(start, stop, n, i)).collect()
}

/// The `i`-th value of [`linspace`] without building the whole axis.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn linspace_at(start: f32, stop: f32, n: u32, i: u32) -> f32 {
    let last = n.saturating_sub(1);
    if last == 0 {
        start
    } else if i == last {
        stop
    } else {
        start + (stop - start) / last as f32 * i as f32
    }
}

/// Axis-aligned region sampled by the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Creates a bounding box from its two corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates a bounding box from per-axis ranges.
    pub fn from_ranges(x: (f32, f32), y: (f32, f32), z: (f32, f32)) -> Self {
        Self {
            min: Vec3::new(x.0, y.0, z.0),
            max: Vec3::new(x.1, y.1, z.1),
        }
    }

    /// Returns the extent along each axis.
    #[must_use]
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns true if all three axes have the same extent within `eps`.
    ///
    /// Voxels are only cubic when this holds. Nothing enforces it.
    #[must_use]
    pub fn is_isotropic(&self, eps: f32) -> bool {
        let e = self.extent();
        (e.x - e.y).abs() <= eps && (e.y - e.z).abs() <= eps
    }

    /// Returns true if `min <= max` on every axis and all values are finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::from_ranges((-1.5, 1.5), (-1.2, 1.8), (-4.2, -1.2))
    }
}

/// A cubic lattice of `resolution^3` nodes spanning a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    bounds: BoundingBox,
    resolution: u32,
}

impl GridSpec {
    /// Creates a lattice, failing fast on a zero resolution or one whose
    /// node count overflows `usize`.
    pub fn new(bounds: BoundingBox, resolution: u32) -> Result<Self> {
        if resolution == 0 || lattice_len(resolution).is_none() {
            return Err(Error::InvalidResolution(resolution));
        }
        Ok(Self { bounds, resolution })
    }

    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Returns the number of nodes along each axis.
    #[must_use]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Returns the total number of nodes.
    #[must_use]
    pub fn num_points(&self) -> usize {
        lattice_len(self.resolution).unwrap_or(usize::MAX)
    }

    /// Returns the distance between adjacent nodes on each axis.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pitch(&self) -> Vec3 {
        if self.resolution < 2 {
            return Vec3::ZERO;
        }
        self.bounds.extent() / (self.resolution - 1) as f32
    }

    /// Per-axis sample coordinates.
    #[must_use]
    pub fn axes(&self) -> [Vec<f32>; 3] {
        let (min, max, n) = (self.bounds.min, self.bounds.max, self.resolution);
        [
            linspace(min.x, max.x, n),
            linspace(min.y, max.y, n),
            linspace(min.z, max.z, n),
        ]
    }

    /// Returns the world position of node `(i, j, k)`.
    #[must_use]
    pub fn position_of_node(&self, i: u32, j: u32, k: u32) -> Vec3 {
        let (min, max, n) = (self.bounds.min, self.bounds.max, self.resolution);
        Vec3::new(
            linspace_at(min.x, max.x, n, i),
            linspace_at(min.y, max.y, n, j),
            linspace_at(min.z, max.z, n, k),
        )
    }

    /// Returns every node position in [`lattice_index`] order.
    #[must_use]
    pub fn sample_points(&self) -> Vec<Vec3> {
        let [xs, ys, zs] = self.axes();
        let mut points = Vec::with_capacity(self.num_points());
        for &x in &xs {
            for &y in &ys {
                for &z in &zs {
                    points.push(Vec3::new(x, y, z));
                }
            }
        }
        points
    }
}

/// Viewing directions for density-only queries: all zero.
#[must_use]
pub fn zero_directions(count: usize) -> Vec<Vec3> {
    vec![Vec3::ZERO; count]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit_box() -> BoundingBox {
        BoundingBox::from_ranges((-1.0, 1.0), (-1.0, 1.0), (-1.0, 1.0))
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let err = GridSpec::new(unit_box(), 0).unwrap_err();
        assert!(matches!(err, Error::InvalidResolution(0)));
    }

    #[test]
    fn test_linspace_endpoints() {
        let xs = linspace(-1.2, 1.8, 7);
        assert_eq!(xs.len(), 7);
        assert_eq!(xs[0], -1.2);
        assert_eq!(xs[6], 1.8);
        assert!((xs[1] - (-0.7)).abs() < 1e-6);
    }

    #[test]
    fn test_overflowing_resolution_rejected() {
        assert_eq!(lattice_len(4), Some(64));
        assert_eq!(lattice_len(u32::MAX), None);
        assert!(matches!(
            GridSpec::new(unit_box(), u32::MAX),
            Err(Error::InvalidResolution(u32::MAX))
        ));
    }

    #[test]
    fn test_node_position_matches_axes() {
        let grid = GridSpec::new(BoundingBox::default(), 7).unwrap();
        let [xs, ys, zs] = grid.axes();
        for i in 0..7 {
            let p = grid.position_of_node(i, 6 - i, 6);
            assert_eq!(p, Vec3::new(xs[i as usize], ys[(6 - i) as usize], zs[6]));
        }
        assert_eq!(grid.position_of_node(6, 6, 6), BoundingBox::default().max);
    }

    #[test]
    fn test_linspace_single() {
        assert_eq!(linspace(3.0, 5.0, 1), vec![3.0]);
        assert!(linspace(3.0, 5.0, 0).is_empty());
    }

    #[test]
    fn test_single_node_grid() {
        let grid = GridSpec::new(unit_box(), 1).unwrap();
        assert_eq!(grid.sample_points(), vec![Vec3::splat(-1.0)]);
        assert_eq!(grid.pitch(), Vec3::ZERO);
    }

    #[test]
    fn test_corners_are_inclusive() {
        let grid = GridSpec::new(unit_box(), 4).unwrap();
        let points = grid.sample_points();
        assert_eq!(points.first().copied(), Some(Vec3::splat(-1.0)));
        assert_eq!(points.last().copied(), Some(Vec3::splat(1.0)));
    }

    #[test]
    fn test_z_varies_fastest() {
        let grid = GridSpec::new(unit_box(), 3).unwrap();
        let points = grid.sample_points();
        assert_eq!(points[0], Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(points[1], Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(points[3], Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(points[9], Vec3::new(0.0, -1.0, -1.0));
    }

    #[test]
    fn test_anisotropic_box_detected() {
        assert!(unit_box().is_isotropic(1e-6));
        assert!(BoundingBox::default().is_isotropic(1e-5));
        let skewed = BoundingBox::from_ranges((0.0, 1.0), (0.0, 2.0), (0.0, 1.0));
        assert!(!skewed.is_isotropic(1e-6));
    }

    #[test]
    fn test_inverted_box_invalid() {
        let inverted = BoundingBox::from_ranges((1.0, -1.0), (0.0, 1.0), (0.0, 1.0));
        assert!(!inverted.is_valid());
        assert!(unit_box().is_valid());
    }

    #[test]
    fn test_directions_are_zero() {
        let dirs = zero_directions(5);
        assert_eq!(dirs.len(), 5);
        assert!(dirs.iter().all(|d| *d == Vec3::ZERO));
    }

    proptest! {
        #[test]
        fn prop_point_count_is_cubic(n in 1u32..12) {
            let grid = GridSpec::new(unit_box(), n).unwrap();
            prop_assert_eq!(grid.sample_points().len(), (n * n * n) as usize);
        }

        #[test]
        fn prop_index_roundtrip(n in 1u32..16, seed in 0usize..4096) {
            let total = (n * n * n) as usize;
            let flat = seed % total;
            let c = lattice_coords(flat, n);
            prop_assert_eq!(lattice_index(c.x, c.y, c.z, n), flat);
        }

        #[test]
        fn prop_points_follow_lattice_index(n in 1u32..8) {
            let grid = GridSpec::new(unit_box(), n).unwrap();
            let points = grid.sample_points();
            for i in 0..n {
                for j in 0..n {
                    for k in 0..n {
                        prop_assert_eq!(
                            points[lattice_index(i, j, k, n)],
                            grid.position_of_node(i, j, k)
                        );
                    }
                }
            }
        }
    }
}
