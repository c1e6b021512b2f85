//! Directory-level background removal.

use std::path::{Path, PathBuf};

use crate::composite::composite_on_white;
use crate::error::{Result, SegmentError};
use crate::manifest::save_masks;
use crate::predictor::{
    select_instances, InstancePredictor, SourceImage, COCO_CHAIR, DEFAULT_SCORE_THRESHOLD,
};

/// Options controlling which instances are cut out.
#[derive(Debug, Clone)]
pub struct RemovalOptions {
    /// Requested class ids, tried in order.
    pub classes: Vec<u32>,
    pub score_threshold: f32,
    /// Directory to export the selected masks to, if any.
    pub save_masks: Option<PathBuf>,
}

impl Default for RemovalOptions {
    fn default() -> Self {
        Self {
            classes: vec![COCO_CHAIR],
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            save_masks: None,
        }
    }
}

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of input images processed.
    pub images: usize,
    /// Number of composited instances written.
    pub instances: usize,
    pub outputs: Vec<PathBuf>,
}

/// Cuts matching objects out of every image in a directory.
pub struct BackgroundRemover<P> {
    predictor: P,
    options: RemovalOptions,
}

impl<P: InstancePredictor> BackgroundRemover<P> {
    pub fn new(predictor: P, options: RemovalOptions) -> Self {
        Self { predictor, options }
    }

    #[must_use]
    pub fn options(&self) -> &RemovalOptions {
        &self.options
    }

    /// Processes one decoded image, writing `<stem>.<i>.png` per selected instance.
    pub fn process(&self, image: &SourceImage, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let instances = select_instances(
            self.predictor.predict(image)?,
            &self.options.classes,
            self.options.score_threshold,
        );
        log::debug!("{}: {} instance(s) selected", image.stem, instances.len());

        if let Some(mask_dir) = &self.options.save_masks {
            let masks: Vec<_> = instances.iter().map(|inst| inst.mask.clone()).collect();
            save_masks(mask_dir, &image.stem, &masks)?;
        }

        let mut written = Vec::with_capacity(instances.len());
        for (i, inst) in instances.iter().enumerate() {
            let out = composite_on_white(&image.pixels, &inst.mask)?;
            let path = output_dir.join(format!("{}.{i}.png", image.stem));
            out.save(&path)?;
            written.push(path);
        }
        Ok(written)
    }

    /// Runs over every regular file in `input_dir`, in name order.
    ///
    /// Both directories are created if missing. A file that cannot be
    /// decoded aborts the run.
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<RunSummary> {
        self.check_mask_export()?;
        std::fs::create_dir_all(input_dir)?;
        std::fs::create_dir_all(output_dir)?;

        let files = list_images(input_dir)?;
        log::info!(
            "Removing backgrounds from {} image(s) in {}",
            files.len(),
            input_dir.display()
        );

        let mut summary = RunSummary::default();
        for (n, path) in files.iter().enumerate() {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| SegmentError::NoStem(path.clone()))?
                .to_string();
            log::info!("[{}/{}] {}", n + 1, files.len(), path.display());

            let pixels = image::open(path)?.to_rgb8();
            let written = self.process(&SourceImage { stem, pixels }, output_dir)?;
            summary.images += 1;
            summary.instances += written.len();
            summary.outputs.extend(written);
        }
        log::info!(
            "Wrote {} image(s) to {}",
            summary.instances,
            output_dir.display()
        );
        Ok(summary)
    }

    /// Mask export must not write into the predictor's own input directory.
    fn check_mask_export(&self) -> Result<()> {
        let (Some(export), Some(source)) = (&self.options.save_masks, self.predictor.input_dir())
        else {
            return Ok(());
        };
        if same_dir(export, source) {
            return Err(SegmentError::MaskExportConflict(export.clone()));
        }
        Ok(())
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
