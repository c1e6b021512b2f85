//! Compositing a masked object onto a white background, and bordered crops.

use image::{Rgb, RgbImage};

use crate::error::{Result, SegmentError};
use crate::mask::InstanceMask;

/// Background colour behind removed pixels.
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Blends `image` over white using `mask` as per-pixel opacity.
///
/// Each channel becomes `src * m + 255 * (1 - m)`, truncated to `u8`, so a
/// weight of one keeps the source pixel and zero gives pure white.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn composite_on_white(image: &RgbImage, mask: &InstanceMask) -> Result<RgbImage> {
    if image.dimensions() != mask.dimensions() {
        return Err(SegmentError::MaskSize {
            expected: image.dimensions(),
            actual: mask.dimensions(),
        });
    }
    Ok(RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let m = mask.get(x, y);
        let src = image.get_pixel(x, y);
        Rgb(src.0.map(|c| (f32::from(c) * m + 255.0 * (1.0 - m)) as u8))
    }))
}

/// How pixels outside the source image are filled when cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Border {
    /// Repeat the nearest edge pixel.
    Replicate,
    /// Fill with a fixed colour.
    Constant(Rgb<u8>),
}

/// A crop window that may extend past the image on any side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Cuts `rect` out of `image`, padding the parts outside it according to `border`.
///
/// The result is always `rect.width x rect.height`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn crop_with_border(image: &RgbImage, rect: CropRect, border: Border) -> RgbImage {
    let (w, h) = (i64::from(image.width()), i64::from(image.height()));
    RgbImage::from_fn(rect.width, rect.height, |ox, oy| {
        let sx = rect.x + i64::from(ox);
        let sy = rect.y + i64::from(oy);
        let inside = (0..w).contains(&sx) && (0..h).contains(&sy);
        match border {
            _ if inside => *image.get_pixel(sx as u32, sy as u32),
            Border::Constant(color) => color,
            Border::Replicate if w == 0 || h == 0 => WHITE,
            Border::Replicate => {
                *image.get_pixel(sx.clamp(0, w - 1) as u32, sy.clamp(0, h - 1) as u32)
            }
        }
    })
}
