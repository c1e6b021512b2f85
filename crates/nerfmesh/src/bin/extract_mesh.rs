//! Extract a mesh from a radiance-field checkpoint.

use anyhow::{Context, Result};
use clap::Parser;
use nerfmesh::cli::{init_logging, ExtractArgs};
use nerfmesh::{extract_mesh, BlobField, FieldCheckpoint};

fn main() -> Result<()> {
    let args = ExtractArgs::parse();
    init_logging(args.verbose);

    let config = args.to_config().context("failed to build configuration")?;
    if args.print_config {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }

    let checkpoint = FieldCheckpoint::load(&config.checkpoint)
        .with_context(|| format!("failed to load {}", config.checkpoint.display()))?;
    let field = BlobField::from(checkpoint);

    let report = extract_mesh(&config, &field).context("mesh extraction failed")?;
    log::info!(
        "Done: {} vertices, {} triangles -> {}",
        report.num_vertices,
        report.num_triangles,
        report.output_path.display()
    );
    Ok(())
}
