//! Mesh export for nerfmesh.
//!
//! [`save_mesh`] picks the encoder from the file extension:
//!
//! | extension | format |
//! |-----------|--------|
//! | `.dae` | Collada 1.4.1 |
//! | `.ply` | binary little-endian PLY |
//! | `.obj` | Wavefront OBJ |
//!
//! Existing files are overwritten.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod collada;
pub mod error;
pub mod obj;
pub mod ply;

use std::path::Path;

use nerfmesh_core::TriangleMesh;

pub use collada::{collada_document, save_collada};
pub use error::{IoError, IoResult};
pub use obj::save_obj;
pub use ply::save_ply;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Collada,
    Ply { binary: bool },
    Obj,
}

impl MeshFormat {
    /// Detects the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> IoResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "dae" => Ok(Self::Collada),
            "ply" => Ok(Self::Ply { binary: true }),
            "obj" => Ok(Self::Obj),
            _ => Err(IoError::UnknownFormat { extension }),
        }
    }

    /// Returns the canonical file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Collada => "dae",
            Self::Ply { .. } => "ply",
            Self::Obj => "obj",
        }
    }
}

/// Save a mesh, choosing the format from the extension of `path`.
pub fn save_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path)?;
    save_mesh_as(mesh, path, format)
}

/// Save a mesh in an explicit format.
pub fn save_mesh_as<P: AsRef<Path>>(
    mesh: &TriangleMesh,
    path: P,
    format: MeshFormat,
) -> IoResult<()> {
    let path = path.as_ref();
    log::info!(
        "Writing {} vertices, {} triangles to {}",
        mesh.num_vertices(),
        mesh.num_triangles(),
        path.display()
    );
    match format {
        MeshFormat::Collada => save_collada(mesh, path),
        MeshFormat::Ply { binary } => save_ply(mesh, path, binary),
        MeshFormat::Obj => save_obj(mesh, path),
    }
}
