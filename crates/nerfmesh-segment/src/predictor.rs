//! Instance predictor capability and class selection.

use std::path::Path;

use image::RgbImage;

use crate::error::Result;
use crate::mask::InstanceMask;

/// COCO category id for "chair".
pub const COCO_CHAIR: u32 = 56;

/// Minimum detection score kept by default.
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.5;

/// An image together with the stem its outputs are named after.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub stem: String,
    pub pixels: RgbImage,
}

/// One detected object.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub class_id: u32,
    pub score: f32,
    pub mask: InstanceMask,
}

/// Produces instance masks for an image.
pub trait InstancePredictor {
    fn predict(&self, image: &SourceImage) -> Result<Vec<Instance>>;

    /// Directory the predictor reads its inputs from, if any.
    fn input_dir(&self) -> Option<&Path> {
        None
    }
}

impl<T: InstancePredictor + ?Sized> InstancePredictor for Box<T> {
    fn predict(&self, image: &SourceImage) -> Result<Vec<Instance>> {
        (**self).predict(image)
    }

    fn input_dir(&self) -> Option<&Path> {
        (**self).input_dir()
    }
}

/// Keeps the instances the caller asked for.
///
/// Instances scoring below `score_threshold` are dropped first. Then the
/// requested classes are tried in order and every instance of the first
/// class with at least one detection is returned. An empty class list keeps
/// everything above the threshold.
pub fn select_instances(
    instances: Vec<Instance>,
    classes: &[u32],
    score_threshold: f32,
) -> Vec<Instance> {
    let confident: Vec<Instance> = instances
        .into_iter()
        .filter(|inst| inst.score >= score_threshold)
        .collect();

    if classes.is_empty() {
        return confident;
    }

    for &class in classes {
        let matching: Vec<Instance> = confident
            .iter()
            .filter(|inst| inst.class_id == class)
            .cloned()
            .collect();
        if !matching.is_empty() {
            return matching;
        }
    }
    Vec::new()
}
