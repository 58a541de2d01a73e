//! Bounds-clamped cropping.

use image::{DynamicImage, GenericImageView};

use crate::domain::BoundingBox;

/// Crops `bbox` out of `image`, clamped to the image bounds.
///
/// The part of the box inside the image is returned; a box that does not
/// overlap the image yields an empty (0x0) image of the same color type.
#[must_use]
pub fn crop_clamped(image: &DynamicImage, bbox: BoundingBox) -> DynamicImage {
    let (width, height) = image.dimensions();
    match bbox.clamp_to(width, height) {
        Some((x, y, w, h)) => image.crop_imm(x, y, w, h),
        None => image.crop_imm(0, 0, 0, 0),
    }
}
