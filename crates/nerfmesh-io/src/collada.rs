//! Collada (`.dae`) export.
//!
//! Writes a COLLADA 1.4.1 document holding a single triangle geometry with
//! one white phong material, instanced once in the default visual scene.
//! Normals are included when the mesh carries one per vertex.

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use nerfmesh_core::TriangleMesh;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{IoError, IoResult};

const NAMESPACE: &str = "http://www.collada.org/2005/11/COLLADASchema";

/// Save a mesh as a Collada document, overwriting `path`.
pub fn save_collada<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> IoResult<()> {
    let xml = collada_document(mesh)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(xml.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Render a mesh as a Collada document string.
pub fn collada_document(mesh: &TriangleMesh) -> IoResult<String> {
    let mut buffer = Vec::new();
    let mut xml = XmlOut::new(&mut buffer);
    let with_normals = !mesh.normals.is_empty() && mesh.normals.len() == mesh.vertices.len();

    xml.event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    xml.start("COLLADA", &[("xmlns", NAMESPACE), ("version", "1.4.1")])?;

    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    xml.start("asset", &[])?;
    xml.start("contributor", &[])?;
    xml.text("authoring_tool", &[], "nerfmesh")?;
    xml.end("contributor")?;
    xml.text("created", &[], &now)?;
    xml.text("modified", &[], &now)?;
    xml.empty("unit", &[("name", "meter"), ("meter", "1")])?;
    xml.text("up_axis", &[], "Y_UP")?;
    xml.end("asset")?;

    xml.start("library_effects", &[])?;
    xml.start("effect", &[("id", "effect0"), ("name", "effect0")])?;
    xml.start("profile_COMMON", &[])?;
    xml.start("technique", &[("sid", "common")])?;
    xml.start("phong", &[])?;
    xml.start("diffuse", &[])?;
    xml.text("color", &[], "1 1 1 1")?;
    xml.end("diffuse")?;
    xml.end("phong")?;
    xml.end("technique")?;
    xml.end("profile_COMMON")?;
    xml.end("effect")?;
    xml.end("library_effects")?;

    xml.start("library_materials", &[])?;
    xml.start("material", &[("id", "material0"), ("name", "material0")])?;
    xml.empty("instance_effect", &[("url", "#effect0")])?;
    xml.end("material")?;
    xml.end("library_materials")?;

    xml.start("library_geometries", &[])?;
    xml.start("geometry", &[("id", "geometry0"), ("name", "mesh")])?;
    xml.start("mesh", &[])?;
    let positions: Vec<f32> = mesh.vertices.iter().flat_map(|v| v.to_array()).collect();
    xml.float_source("verts-array", &positions, ["X", "Y", "Z"])?;
    if with_normals {
        let normals: Vec<f32> = mesh.normals.iter().flat_map(|n| n.to_array()).collect();
        xml.float_source("normals-array", &normals, ["X", "Y", "Z"])?;
    }
    xml.start("vertices", &[("id", "verts-vertices")])?;
    xml.empty("input", &[("semantic", "POSITION"), ("source", "#verts-array")])?;
    xml.end("vertices")?;

    let tri_count = mesh.triangles.len().to_string();
    xml.start(
        "triangles",
        &[("count", tri_count.as_str()), ("material", "materialref")],
    )?;
    xml.empty(
        "input",
        &[
            ("offset", "0"),
            ("semantic", "VERTEX"),
            ("source", "#verts-vertices"),
        ],
    )?;
    if with_normals {
        xml.empty(
            "input",
            &[
                ("offset", "0"),
                ("semantic", "NORMAL"),
                ("source", "#normals-array"),
            ],
        )?;
    }
    let indices = join(mesh.triangles.iter().flatten());
    xml.text("p", &[], &indices)?;
    xml.end("triangles")?;
    xml.end("mesh")?;
    xml.end("geometry")?;
    xml.end("library_geometries")?;

    xml.start("library_visual_scenes", &[])?;
    xml.start("visual_scene", &[("id", "scene0")])?;
    xml.start("node", &[("id", "node0"), ("name", "node0")])?;
    xml.start("instance_geometry", &[("url", "#geometry0")])?;
    xml.start("bind_material", &[])?;
    xml.start("technique_common", &[])?;
    xml.empty(
        "instance_material",
        &[("symbol", "materialref"), ("target", "#material0")],
    )?;
    xml.end("technique_common")?;
    xml.end("bind_material")?;
    xml.end("instance_geometry")?;
    xml.end("node")?;
    xml.end("visual_scene")?;
    xml.end("library_visual_scenes")?;

    xml.start("scene", &[])?;
    xml.empty("instance_visual_scene", &[("url", "#scene0")])?;
    xml.end("scene")?;

    xml.end("COLLADA")?;

    String::from_utf8(buffer)
        .map_err(|e| IoError::invalid_content(format!("invalid UTF-8 in generated XML: {e}")))
}

fn join<T: ToString>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Thin wrapper over the quick-xml writer that folds encoder errors into [`IoError`].
struct XmlOut<'a> {
    writer: Writer<Cursor<&'a mut Vec<u8>>>,
}

impl<'a> XmlOut<'a> {
    fn new(buffer: &'a mut Vec<u8>) -> Self {
        Self {
            writer: Writer::new_with_indent(Cursor::new(buffer), b' ', 2),
        }
    }

    fn event(&mut self, event: Event<'_>) -> IoResult<()> {
        self.writer
            .write_event(event)
            .map_err(|e| IoError::invalid_content(format!("failed to write XML: {e}")))
    }

    fn open<'b>(name: &'b str, attrs: &[(&'b str, &'b str)]) -> BytesStart<'b> {
        let mut element = BytesStart::new(name);
        for &attr in attrs {
            element.push_attribute(attr);
        }
        element
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> IoResult<()> {
        self.event(Event::Start(Self::open(name, attrs)))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> IoResult<()> {
        self.event(Event::Empty(Self::open(name, attrs)))
    }

    fn end(&mut self, name: &str) -> IoResult<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, name: &str, attrs: &[(&str, &str)], content: &str) -> IoResult<()> {
        self.start(name, attrs)?;
        self.event(Event::Text(BytesText::new(content)))?;
        self.end(name)
    }

    /// Writes a `<source>` holding a float array read in strides of `params.len()`.
    fn float_source(&mut self, id: &str, values: &[f32], params: [&str; 3]) -> IoResult<()> {
        let array_id = format!("{id}-array");
        let array_ref = format!("#{array_id}");
        let count = values.len().to_string();
        let accessor_count = (values.len() / params.len()).to_string();
        let stride = params.len().to_string();

        self.start("source", &[("id", id)])?;
        self.text(
            "float_array",
            &[("id", array_id.as_str()), ("count", count.as_str())],
            &join(values),
        )?;
        self.start("technique_common", &[])?;
        self.start(
            "accessor",
            &[
                ("count", accessor_count.as_str()),
                ("source", array_ref.as_str()),
                ("stride", stride.as_str()),
            ],
        )?;
        for param in params {
            self.empty("param", &[("name", param), ("type", "float")])?;
        }
        self.end("accessor")?;
        self.end("technique_common")?;
        self.end("source")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use quick_xml::events::Event;
    use quick_xml::Reader;

    fn triangle() -> TriangleMesh {
        TriangleMesh {
            vertices: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.5, 0.25),
            ],
            normals: vec![Vec3::Z; 3],
            triangles: vec![[0, 1, 2]],
        }
    }

    /// Collects the text of every element called `name`.
    fn texts_of(xml: &str, name: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut inside = false;
        let mut found = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) if e.name().as_ref() == name.as_bytes() => {
                    inside = true;
                    found.push(String::new());
                }
                Event::Text(t) if inside => {
                    let text = t.unescape().unwrap();
                    if let Some(last) = found.last_mut() {
                        last.push_str(text.trim());
                    }
                }
                Event::End(e) if e.name().as_ref() == name.as_bytes() => inside = false,
                Event::Eof => break,
                _ => {}
            }
        }
        found
    }

    #[test]
    fn test_document_carries_geometry() {
        let xml = collada_document(&triangle()).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains(NAMESPACE));

        let arrays = texts_of(&xml, "float_array");
        assert_eq!(arrays.len(), 2);
        assert_eq!(arrays[0], "0 0 0 1 0 0 0 0.5 0.25");
        assert_eq!(arrays[1], "0 0 1 0 0 1 0 0 1");
        assert_eq!(texts_of(&xml, "p"), vec!["0 1 2".to_string()]);
        assert!(xml.contains(r#"<triangles count="1""#));
    }

    #[test]
    fn test_normals_skipped_when_missing() {
        let mut mesh = triangle();
        mesh.normals.clear();
        let xml = collada_document(&mesh).unwrap();
        assert_eq!(texts_of(&xml, "float_array").len(), 1);
        assert!(!xml.contains("NORMAL"));
    }

    #[test]
    fn test_empty_mesh_is_valid_document() {
        let xml = collada_document(&TriangleMesh::default()).unwrap();
        assert!(xml.contains(r#"<triangles count="0""#));
        assert!(xml.contains(r#"count="0""#));
        assert!(xml.trim_end().ends_with("</COLLADA>"));
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.dae");
        std::fs::write(&path, "stale").unwrap();
        save_collada(&triangle(), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<COLLADA"));
        assert!(!written.contains("stale"));
    }
}
