//! Wavefront OBJ export.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nerfmesh_core::TriangleMesh;

use crate::error::IoResult;

/// Save a mesh as a Wavefront OBJ file. Normals are written when present.
pub fn save_obj<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> IoResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_obj(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn write_obj<W: Write>(mesh: &TriangleMesh, writer: &mut W) -> IoResult<()> {
    let with_normals = !mesh.normals.is_empty() && mesh.normals.len() == mesh.vertices.len();

    writeln!(writer, "# Generated by nerfmesh")?;
    writeln!(
        writer,
        "# {} vertices, {} triangles",
        mesh.vertices.len(),
        mesh.triangles.len()
    )?;
    for v in &mesh.vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    if with_normals {
        for n in &mesh.normals {
            writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
        }
    }
    // OBJ indices are 1-based
    for &[a, b, c] in &mesh.triangles {
        let (a, b, c) = (a + 1, b + 1, c + 1);
        if with_normals {
            writeln!(writer, "f {a}//{a} {b}//{b} {c}//{c}")?;
        } else {
            writeln!(writer, "f {a} {b} {c}")?;
        }
    }
    Ok(())
}
