//! Core of nerfmesh.
//!
//! This crate provides the stages of turning a radiance field into a mesh:
//! - [`GridSpec`] lattice sampling with the shared [`lattice_index`] layout
//! - [`RadianceField`] capability, positional [`Embedding`] and [`BatchedEvaluator`]
//! - [`DensityVolume`] assembly with the non-negative density floor
//! - [`marching_cubes`] isosurface extraction into a [`TriangleMesh`]
//! - [`ExtractionConfig`] and the procedural [`BlobField`]

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod blob;
pub mod config;
pub mod error;
pub mod field;
pub mod grid;
pub mod marching_cubes;
pub mod mesh;
pub mod volume;

pub use blob::{Blob, BlobField, FieldCheckpoint};
pub use config::ExtractionConfig;
pub use error::{Error, Result};
pub use field::{
    BatchedEvaluator, Embedding, EncodedBatch, FieldSample, RadianceField, DEFAULT_CHUNK_SIZE,
};
pub use grid::{
    lattice_coords, lattice_index, lattice_len, linspace, linspace_at, zero_directions,
    BoundingBox, GridSpec,
};
pub use marching_cubes::{extract_isosurface, marching_cubes};
pub use mesh::TriangleMesh;
pub use volume::DensityVolume;

// Re-export glam types for convenience
pub use glam::{UVec3, Vec3};
