//! Predictor backed by precomputed masks, and mask export.
//!
//! A masks directory holds one `<stem>.json` per image:
//!
//! ```json
//! { "instances": [ { "class_id": 56, "score": 0.93, "mask": "chair_0.png" } ] }
//! ```
//!
//! Mask paths are relative to the manifest. An image without a manifest has
//! no instances.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmentError};
use crate::mask::InstanceMask;
use crate::predictor::{Instance, InstancePredictor, SourceImage};

/// One entry of a mask manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub class_id: u32,
    #[serde(default = "full_score")]
    pub score: f32,
    pub mask: PathBuf,
}

fn full_score() -> f32 {
    1.0
}

/// Per-image list of precomputed instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub instances: Vec<ManifestEntry>,
}

/// Reads instance masks produced ahead of time by an external segmenter.
#[derive(Debug, Clone)]
pub struct ManifestPredictor {
    root: PathBuf,
}

impl ManifestPredictor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the manifest path for an image stem.
    #[must_use]
    pub fn manifest_path(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{stem}.json"))
    }

    fn load_manifest(&self, stem: &str) -> Result<Manifest> {
        let path = self.manifest_path(stem);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No manifest for {stem} at {}", path.display());
                Ok(Manifest::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl InstancePredictor for ManifestPredictor {
    fn predict(&self, image: &SourceImage) -> Result<Vec<Instance>> {
        let manifest = self.load_manifest(&image.stem)?;
        manifest
            .instances
            .into_iter()
            .map(|entry| {
                let mask_path = self.root.join(&entry.mask);
                let luma = image::open(&mask_path)
                    .map_err(|e| SegmentError::Predictor {
                        stem: image.stem.clone(),
                        message: format!("cannot read mask {}: {e}", mask_path.display()),
                    })?
                    .to_luma8();
                Ok(Instance {
                    class_id: entry.class_id,
                    score: entry.score,
                    mask: InstanceMask::from_luma(&luma),
                })
            })
            .collect()
    }

    fn input_dir(&self) -> Option<&Path> {
        Some(&self.root)
    }
}

/// Listing written next to exported masks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaskListing {
    pub files: Vec<String>,
}

/// Writes each mask as an 8-bit PNG plus a `<stem>.masks.json` listing.
///
/// The first mask is `<stem>.png`, later ones `<stem>_<i>.png`. The listing
/// name never collides with a `<stem>.json` manifest.
pub fn save_masks(dir: &Path, stem: &str, masks: &[InstanceMask]) -> Result<MaskListing> {
    std::fs::create_dir_all(dir)?;
    let mut listing = MaskListing::default();
    for (i, mask) in masks.iter().enumerate() {
        let name = if i == 0 {
            format!("{stem}.png")
        } else {
            format!("{stem}_{i}.png")
        };
        mask.to_luma().save(dir.join(&name))?;
        listing.files.push(name);
    }
    std::fs::write(
        dir.join(format!("{stem}.masks.json")),
        serde_json::to_string(&listing)?,
    )?;
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage};

    fn source(stem: &str) -> SourceImage {
        SourceImage {
            stem: stem.to_string(),
            pixels: RgbImage::new(2, 2),
        }
    }

    #[test]
    fn test_missing_manifest_means_no_instances() {
        let dir = tempfile::tempdir().unwrap();
        let predictor = ManifestPredictor::new(dir.path());
        assert!(predictor.predict(&source("nothing")).unwrap().is_empty());
    }

    #[test]
    fn test_reads_masks_from_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let mut mask = GrayImage::new(2, 2);
        mask.put_pixel(0, 0, Luma([255]));
        mask.save(dir.path().join("img_a.png")).unwrap();
        std::fs::write(
            dir.path().join("img.json"),
            r#"{"instances": [{"class_id": 56, "score": 0.8, "mask": "img_a.png"},
                              {"class_id": 0, "mask": "img_a.png"}]}"#,
        )
        .unwrap();

        let instances = ManifestPredictor::new(dir.path())
            .predict(&source("img"))
            .unwrap();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].class_id, 56);
        assert_eq!(instances[0].score, 0.8);
        assert_eq!(instances[1].score, 1.0);
        assert_eq!(instances[0].mask.get(0, 0), 1.0);
        assert_eq!(instances[0].mask.get(1, 1), 0.0);
    }

    #[test]
    fn test_missing_mask_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("img.json"),
            r#"{"instances": [{"class_id": 56, "mask": "gone.png"}]}"#,
        )
        .unwrap();
        let err = ManifestPredictor::new(dir.path())
            .predict(&source("img"))
            .unwrap_err();
        assert!(matches!(err, SegmentError::Predictor { .. }));
    }

    #[test]
    fn test_save_masks_names_and_listing() {
        let dir = tempfile::tempdir().unwrap();
        let masks = vec![
            InstanceMask::from_bools(1, 1, &[true]).unwrap(),
            InstanceMask::from_bools(1, 1, &[false]).unwrap(),
        ];
        let listing = save_masks(dir.path(), "photo", &masks).unwrap();
        assert_eq!(listing.files, vec!["photo.png", "photo_1.png"]);
        assert!(dir.path().join("photo_1.png").exists());

        assert!(!dir.path().join("photo.json").exists());
        let text = std::fs::read_to_string(dir.path().join("photo.masks.json")).unwrap();
        let parsed: MaskListing = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, listing);

        let first = image::open(dir.path().join("photo.png")).unwrap().to_luma8();
        assert_eq!(first.get_pixel(0, 0).0[0], 255);
    }
}
