//! In-memory triangle mesh produced by isosurface extraction.

use glam::Vec3;

use crate::grid::GridSpec;

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Vec3>,
    /// Per-vertex unit normals (same length as `vertices`).
    pub normals: Vec<Vec3>,
    /// Triangles as index triples into `vertices`.
    pub triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Returns the axis-aligned bounds of the vertices, if any.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    /// Returns the mean vertex position, if any.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self) -> Option<Vec3> {
        if self.vertices.is_empty() {
            return None;
        }
        Some(self.vertices.iter().copied().sum::<Vec3>() / self.vertices.len() as f32)
    }

    /// Divides every vertex coordinate by the lattice resolution.
    ///
    /// Maps lattice-index space to roughly `[0, 1]^3`. This does not rescale
    /// into the sampled bounding box; see [`TriangleMesh::to_world`].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn normalized(mut self, resolution: u32) -> Self {
        let scale = resolution.max(1) as f32;
        for v in &mut self.vertices {
            *v /= scale;
        }
        self
    }

    /// Maps lattice-index space vertices to world coordinates of `grid`.
    #[must_use]
    pub fn to_world(mut self, grid: &GridSpec) -> Self {
        let pitch = grid.pitch();
        let origin = grid.bounds().min;
        for v in &mut self.vertices {
            *v = origin + *v * pitch;
        }
        self
    }
}
