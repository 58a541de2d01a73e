//! Decoded images with their origin.

use image::GenericImageView;

/// A decoded image together with where it came from.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Path or URI the image was loaded from.
    pub path: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Decoded image data.
    pub image: image::DynamicImage,
}

impl ImageInfo {
    /// Wraps a decoded image, reading its dimensions.
    #[must_use]
    pub fn new(path: impl Into<String>, image: image::DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            path: path.into(),
            width,
            height,
            image,
        }
    }
}

impl std::ops::Deref for ImageInfo {
    type Target = image::DynamicImage;

    fn deref(&self) -> &Self::Target {
        &self.image
    }
}
