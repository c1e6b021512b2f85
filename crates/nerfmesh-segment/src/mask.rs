//! Soft instance masks.

use image::{GrayImage, Luma};

use crate::error::{Result, SegmentError};

/// Per-pixel foreground weight in `[0, 1]`, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceMask {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl InstanceMask {
    /// Creates a mask, clamping weights into `[0, 1]`.
    pub fn new(width: u32, height: u32, mut data: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(SegmentError::MaskData {
                expected,
                actual: data.len(),
            });
        }
        for w in &mut data {
            *w = w.clamp(0.0, 1.0);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates a hard mask from booleans.
    pub fn from_bools(width: u32, height: u32, data: &[bool]) -> Result<Self> {
        Self::new(
            width,
            height,
            data.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect(),
        )
    }

    /// Creates a mask from an 8-bit image, mapping `0..=255` to `0..=1`.
    pub fn from_luma(image: &GrayImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: image.pixels().map(|p| f32::from(p.0[0]) / 255.0).collect(),
        }
    }

    /// Renders the mask as an 8-bit image.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([(self.get(x, y) * 255.0).round() as u8])
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Weight at `(x, y)`; zero outside the mask.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Number of pixels with weight above one half.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.data.iter().filter(|&&w| w > 0.5).count()
    }
}
