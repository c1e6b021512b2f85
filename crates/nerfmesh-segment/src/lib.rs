//! Background removal for nerfmesh capture sets.
//!
//! Every image in an input directory is passed to an [`InstancePredictor`],
//! the instances of the first requested class that was detected are kept
//! ([`select_instances`]), and each one is composited onto white
//! ([`composite_on_white`]) and written as `<stem>.<index>.png`.
//!
//! [`ManifestPredictor`] supplies masks computed ahead of time; any other
//! segmenter can be plugged in by implementing the trait.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod composite;
pub mod error;
pub mod manifest;
pub mod mask;
pub mod predictor;
pub mod runner;

pub use composite::{composite_on_white, crop_with_border, Border, CropRect, WHITE};
pub use error::{Result, SegmentError};
pub use manifest::{save_masks, Manifest, ManifestEntry, ManifestPredictor, MaskListing};
pub use mask::InstanceMask;
pub use predictor::{
    select_instances, Instance, InstancePredictor, SourceImage, COCO_CHAIR,
    DEFAULT_SCORE_THRESHOLD,
};
pub use runner::{BackgroundRemover, RemovalOptions, RunSummary};
