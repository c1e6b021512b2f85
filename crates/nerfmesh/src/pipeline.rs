//! The mesh extraction run, from lattice to file.

use std::path::PathBuf;

use nerfmesh_core::{
    extract_isosurface, zero_directions, DensityVolume, ExtractionConfig, RadianceField, Result,
    TriangleMesh,
};

/// Tolerance used when checking that the bounding box is a cube.
const ISOTROPY_EPS: f32 = 1e-4;

/// Outcome of [`extract_mesh`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    /// Where the mesh was written.
    pub output_path: PathBuf,
    /// Number of lattice nodes evaluated.
    pub num_points: usize,
    pub num_vertices: usize,
    pub num_triangles: usize,
    /// Largest density seen after flooring.
    pub max_density: f32,
}

/// Runs every stage up to the normalized mesh without writing anything.
///
/// Returns the mesh, already divided by the resolution, and the density volume
/// it was extracted from.
pub fn build_mesh<M: RadianceField + ?Sized>(
    config: &ExtractionConfig,
    model: &M,
) -> Result<(TriangleMesh, DensityVolume)> {
    config.validate()?;
    if !config.bounds.is_isotropic(ISOTROPY_EPS) {
        log::warn!(
            "Bounding box extents {:?} differ; the mesh will be stretched",
            config.bounds.extent()
        );
    }
    log::debug!(
        "Dataset {} at {}x{} (informational)",
        config.dataset_root.display(),
        config.image_size[0],
        config.image_size[1]
    );

    let grid = config.grid()?;
    let points = grid.sample_points();
    let dirs = zero_directions(points.len());
    log::info!(
        "Sampling {} points at resolution {}",
        points.len(),
        grid.resolution()
    );

    let samples = config.evaluator()?.evaluate(model, &points, &dirs)?;
    let volume = DensityVolume::assemble(grid.resolution(), &samples)?;
    log::info!(
        "Density max {:.3}, {} node(s) above threshold {}",
        volume.max_density(),
        volume.count_above(config.density_threshold),
        config.density_threshold
    );

    let mesh = extract_isosurface(&volume, config.density_threshold);
    if mesh.is_empty() {
        log::warn!(
            "No surface at threshold {}; writing an empty mesh",
            config.density_threshold
        );
    }
    Ok((mesh.normalized(grid.resolution()), volume))
}

/// Extracts the density isosurface of `model` and writes it to
/// [`ExtractionConfig::output_path`].
///
/// Vertices are in normalized lattice space (index divided by resolution);
/// they are not mapped back into the bounding box.
pub fn extract_mesh<M: RadianceField + ?Sized>(
    config: &ExtractionConfig,
    model: &M,
) -> Result<ExtractionReport> {
    let (mesh, volume) = build_mesh(config, model)?;
    let output_path = config.output_path();
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    nerfmesh_io::save_mesh(&mesh, &output_path)?;

    Ok(ExtractionReport {
        output_path,
        num_points: volume.values().len(),
        num_vertices: mesh.num_vertices(),
        num_triangles: mesh.num_triangles(),
        max_density: volume.max_density(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nerfmesh_core::{BoundingBox, EncodedBatch, Error, FieldSample, Vec3};

    struct Constant(f32);

    impl RadianceField for Constant {
        fn evaluate(&self, batch: &EncodedBatch) -> Result<Vec<FieldSample>> {
            Ok(vec![FieldSample::new([0.0; 3], self.0); batch.len()])
        }
    }

    struct Broken;

    impl RadianceField for Broken {
        fn evaluate(&self, _batch: &EncodedBatch) -> Result<Vec<FieldSample>> {
            Err(Error::invalid_config("weights missing"))
        }
    }

    fn small_config(dir: &std::path::Path) -> ExtractionConfig {
        ExtractionConfig {
            bounds: BoundingBox::new(Vec3::splat(-1.0), Vec3::splat(1.0)),
            resolution: 4,
            chunk_size: 5,
            output_dir: dir.to_path_buf(),
            ..ExtractionConfig::default()
        }
    }

    #[test]
    fn test_uniform_field_gives_empty_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let report = extract_mesh(&small_config(dir.path()), &Constant(1.0)).unwrap();
        assert_eq!(report.num_points, 64);
        assert_eq!(report.num_triangles, 0);
        assert_eq!(report.max_density, 1.0);
        assert!(report.output_path.exists());
    }

    #[test]
    fn test_negative_density_floored() {
        let dir = tempfile::tempdir().unwrap();
        let (_, volume) = build_mesh(&small_config(dir.path()), &Constant(-3.0)).unwrap();
        assert!(volume.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_model_failure_aborts_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config(dir.path());
        let err = extract_mesh(&config, &Broken).unwrap_err();
        assert!(matches!(err, Error::ModelFailure { chunk: 0, .. }));
        assert!(!config.output_path().exists());
    }

    #[test]
    fn test_invalid_resolution_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExtractionConfig {
            resolution: 0,
            ..small_config(dir.path())
        };
        assert!(matches!(
            extract_mesh(&config, &Constant(0.0)),
            Err(Error::InvalidResolution(0))
        ));
    }

    #[test]
    fn test_output_dir_created() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config(&dir.path().join("meshes"));
        let report = extract_mesh(&config, &Constant(0.0)).unwrap();
        assert_eq!(report.output_path, dir.path().join("meshes").join("chair.dae"));
        assert!(report.output_path.exists());
    }
}
