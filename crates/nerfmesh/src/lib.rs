//! nerfmesh: turn a trained radiance field into a triangle mesh.
//!
//! # Quick Start
//!
//! ```no_run
//! use nerfmesh::*;
//!
//! fn main() -> Result<()> {
//!     let config = ExtractionConfig {
//!         resolution: 128,
//!         ..ExtractionConfig::default()
//!     };
//!     let field = BlobField::from(FieldCheckpoint::load(&config.checkpoint)?);
//!
//!     let report = extract_mesh(&config, &field)?;
//!     println!("{} triangles in {}", report.num_triangles, report.output_path.display());
//!     Ok(())
//! }
//! ```
//!
//! # Pipeline
//!
//! 1. [`GridSpec`] lays out `N^3` query points over a bounding box.
//! 2. [`BatchedEvaluator`] encodes them and queries the [`RadianceField`] in chunks.
//! 3. [`DensityVolume`] reshapes the densities, flooring negatives at zero.
//! 4. [`extract_isosurface`] runs marching cubes at the density threshold.
//! 5. The mesh is divided by `N` and written by [`save_mesh`].
//!
//! The [`segment`] module prepares capture sets by cutting objects out of
//! their backgrounds.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod cli;
mod pipeline;

pub use nerfmesh_core::{
    extract_isosurface, lattice_coords, lattice_index, linspace, marching_cubes, zero_directions,
    BatchedEvaluator, Blob, BlobField, BoundingBox, DensityVolume, Embedding, EncodedBatch, Error,
    ExtractionConfig, FieldCheckpoint, FieldSample, GridSpec, RadianceField, Result, TriangleMesh,
    UVec3, Vec3, DEFAULT_CHUNK_SIZE,
};
pub use nerfmesh_io::{save_mesh, save_mesh_as, IoError, MeshFormat};
pub use pipeline::{build_mesh, extract_mesh, ExtractionReport};

/// Background removal for capture sets.
pub mod segment {
    pub use nerfmesh_segment::*;
}
