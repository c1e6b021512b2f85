//! Cut objects out of a directory of photos and place them on white.

use anyhow::{Context, Result};
use clap::Parser;
use nerfmesh::cli::{init_logging, RemoveArgs};
use nerfmesh::segment::{BackgroundRemover, ManifestPredictor};

fn main() -> Result<()> {
    let args = RemoveArgs::parse();
    init_logging(args.verbose);

    log::warn!(
        "Ignoring crop settings: {}",
        args.ignored_flags().join(", ")
    );

    let predictor = ManifestPredictor::new(&args.masks);
    let remover = BackgroundRemover::new(predictor, args.removal_options());
    let summary = remover
        .run(&args.input, &args.output)
        .with_context(|| format!("background removal failed in {}", args.input.display()))?;

    log::info!(
        "Processed {} image(s), wrote {} cut-out(s)",
        summary.images,
        summary.instances
    );
    Ok(())
}
