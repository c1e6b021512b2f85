//! PLY (Polygon File Format) export.
//!
//! ASCII output goes through `ply-rs`; binary little-endian output is
//! written by hand because `ply-rs` miscounts list properties in binary mode.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nerfmesh_core::TriangleMesh;
use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;

use crate::error::{IoError, IoResult};

const COMMENT: &str = "Generated by nerfmesh";

/// Save a mesh to a PLY file, binary little-endian or ASCII.
pub fn save_ply<P: AsRef<Path>>(mesh: &TriangleMesh, path: P, binary: bool) -> IoResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    if binary {
        write_ply_binary(mesh, &mut writer)?;
    } else {
        write_ply_ascii(mesh, &mut writer)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_ply_binary<W: Write>(mesh: &TriangleMesh, writer: &mut W) -> IoResult<()> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format binary_little_endian 1.0")?;
    writeln!(writer, "comment {COMMENT}")?;
    writeln!(writer, "element vertex {}", mesh.vertices.len())?;
    writeln!(writer, "property float x")?;
    writeln!(writer, "property float y")?;
    writeln!(writer, "property float z")?;
    writeln!(writer, "element face {}", mesh.triangles.len())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    writeln!(writer, "end_header")?;

    for v in &mesh.vertices {
        for c in v.to_array() {
            writer.write_all(&c.to_le_bytes())?;
        }
    }

    for tri in &mesh.triangles {
        writer.write_all(&[3u8])?;
        for &i in tri {
            writer.write_all(&index_to_i32(i)?.to_le_bytes())?;
        }
    }

    Ok(())
}

fn write_ply_ascii<W: Write>(mesh: &TriangleMesh, writer: &mut W) -> IoResult<()> {
    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = Encoding::Ascii;
    ply.header.comments.push(COMMENT.to_string());

    let mut vertex_def = ElementDef::new("vertex".to_string());
    for axis in ["x", "y", "z"] {
        vertex_def.properties.add(PropertyDef::new(
            axis.to_string(),
            PropertyType::Scalar(ScalarType::Float),
        ));
    }
    vertex_def.count = mesh.vertices.len();
    ply.header.elements.add(vertex_def);

    let mut face_def = ElementDef::new("face".to_string());
    face_def.properties.add(PropertyDef::new(
        "vertex_indices".to_string(),
        PropertyType::List(ScalarType::UChar, ScalarType::Int),
    ));
    face_def.count = mesh.triangles.len();
    ply.header.elements.add(face_def);

    let vertices = mesh
        .vertices
        .iter()
        .map(|v| {
            let mut element = DefaultElement::new();
            element.insert("x".to_string(), Property::Float(v.x));
            element.insert("y".to_string(), Property::Float(v.y));
            element.insert("z".to_string(), Property::Float(v.z));
            element
        })
        .collect();
    ply.payload.insert("vertex".to_string(), vertices);

    let mut faces = Vec::with_capacity(mesh.triangles.len());
    for tri in &mesh.triangles {
        let indices = tri
            .iter()
            .map(|&i| index_to_i32(i))
            .collect::<IoResult<Vec<i32>>>()?;
        let mut element = DefaultElement::new();
        element.insert("vertex_indices".to_string(), Property::ListInt(indices));
        faces.push(element);
    }
    ply.payload.insert("face".to_string(), faces);

    Writer::new()
        .write_ply(writer, &mut ply)
        .map_err(|e| IoError::invalid_content(format!("failed to write PLY: {e}")))?;
    Ok(())
}

fn index_to_i32(index: u32) -> IoResult<i32> {
    i32::try_from(index)
        .map_err(|_| IoError::invalid_content(format!("vertex index {index} exceeds PLY int range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use ply_rs::parser::Parser;
    use std::io::BufReader;

    fn two_triangles() -> TriangleMesh {
        TriangleMesh {
            vertices: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.25, 0.0, 0.0),
                Vec3::new(0.0, 0.25, 0.0),
                Vec3::new(0.25, 0.25, 0.5),
            ],
            normals: Vec::new(),
            triangles: vec![[0, 1, 2], [1, 3, 2]],
        }
    }

    fn read_back(path: &Path) -> Ply<DefaultElement> {
        let mut reader = BufReader::new(File::open(path).unwrap());
        Parser::<DefaultElement>::new().read_ply(&mut reader).unwrap()
    }

    #[test]
    fn test_ascii_readable_by_parser() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.ply");
        save_ply(&two_triangles(), &path, false).unwrap();

        let ply = read_back(&path);
        assert_eq!(ply.payload["vertex"].len(), 4);
        assert_eq!(ply.payload["face"].len(), 2);
        assert!(matches!(ply.payload["vertex"][3]["z"], Property::Float(z) if z == 0.5));
        assert!(matches!(
            &ply.payload["face"][1]["vertex_indices"],
            Property::ListInt(v) if v == &[1, 3, 2]
        ));
    }

    #[test]
    fn test_binary_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.ply");
        let mesh = two_triangles();
        save_ply(&mesh, &path, true).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let marker = b"end_header\n";
        let body_start = bytes
            .windows(marker.len())
            .position(|w| w == marker)
            .unwrap()
            + marker.len();
        // 4 vertices * 12 bytes + 2 faces * (1 + 12) bytes
        assert_eq!(bytes.len() - body_start, 4 * 12 + 2 * 13);

        let ply = read_back(&path);
        assert_eq!(ply.payload["vertex"].len(), 4);
        assert!(matches!(ply.payload["vertex"][1]["x"], Property::Float(x) if x == 0.25));
    }

    #[test]
    fn test_empty_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.ply");
        save_ply(&TriangleMesh::default(), &path, false).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("element vertex 0"));
        assert!(text.contains("element face 0"));
    }
}
