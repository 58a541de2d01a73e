//! Synthetic frame builders for testing.

use gaze_front_core::domain::ImageInfo;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, RgbaImage};

/// Builder for creating synthetic test frames.
///
/// The stages never look at pixel content beyond handing it to the model,
/// so frames mostly need the right size, channel count and a few
/// recognizable pixels for checking crops and channel order.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    /// Creates a uniformly colored RGB frame.
    #[must_use]
    pub fn rgb_uniform(width: u32, height: u32, r: u8, g: u8, b: u8) -> ImageInfo {
        let img = RgbImage::from_fn(width, height, |_, _| Rgb([r, g, b]));
        ImageInfo::new("synthetic://rgb_uniform", DynamicImage::ImageRgb8(img))
    }

    /// Creates a single-channel frame, which the stages reject.
    #[must_use]
    pub fn grayscale(width: u32, height: u32, value: u8) -> ImageInfo {
        let img = GrayImage::from_fn(width, height, |_, _| Luma([value]));
        ImageInfo::new("synthetic://grayscale", DynamicImage::ImageLuma8(img))
    }

    /// Creates a four-channel frame with a uniform color and full alpha.
    #[must_use]
    pub fn rgba_uniform(width: u32, height: u32, r: u8, g: u8, b: u8) -> ImageInfo {
        let img = RgbaImage::from_fn(width, height, |_, _| image::Rgba([r, g, b, 255]));
        ImageInfo::new("synthetic://rgba_uniform", DynamicImage::ImageRgba8(img))
    }

    /// Creates a frame whose pixel at `(x, y)` encodes its own position.
    ///
    /// Red is `x % 256`, green is `y % 256` and blue is zero, so a crop can
    /// be traced back to its origin in the frame.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn coordinate_ramp(width: u32, height: u32) -> ImageInfo {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 0])
        });
        ImageInfo::new("synthetic://coordinate_ramp", DynamicImage::ImageRgb8(img))
    }

    /// Returns a standard 640x480 mid-gray frame.
    #[must_use]
    pub fn frame() -> ImageInfo {
        Self::rgb_uniform(640, 480, 128, 128, 128)
    }
}
