//! Pixel and normalized geometry shared by the stages.

// Denormalization truncates toward zero, as the detection models expect.
#![allow(clippy::cast_possible_truncation)]

use serde::{Deserialize, Serialize};

/// Integer pixel rectangle.
///
/// Coordinates are signed: eye windows built around a landmark near the
/// image edge can extend past the image on any side. The fields are named so
/// that no caller depends on an array order; use [`Self::to_corner_array`]
/// or [`Self::to_axis_array`] when a flat layout is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge (inclusive).
    pub xmin: i32,
    /// Top edge (inclusive).
    pub ymin: i32,
    /// Right edge (exclusive).
    pub xmax: i32,
    /// Bottom edge (exclusive).
    pub ymax: i32,
}

impl BoundingBox {
    /// Creates a box from its four edges.
    #[must_use]
    pub const fn new(xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Denormalizes `[xmin, ymin, xmax, ymax]` in `[0, 1]` against an image size.
    ///
    /// x values scale by `width`, y values by `height`; the products are
    /// truncated toward zero.
    #[must_use]
    pub fn from_normalized(corners: [f32; 4], width: u32, height: u32) -> Self {
        Self {
            xmin: denormalize(corners[0], width),
            ymin: denormalize(corners[1], height),
            xmax: denormalize(corners[2], width),
            ymax: denormalize(corners[3], height),
        }
    }

    /// Square window of `half_size` pixels on each side of `center`.
    ///
    /// Edges saturate at the `i32` range.
    #[must_use]
    pub const fn around(center: (i32, i32), half_size: i32) -> Self {
        Self {
            xmin: center.0.saturating_sub(half_size),
            ymin: center.1.saturating_sub(half_size),
            xmax: center.0.saturating_add(half_size),
            ymax: center.1.saturating_add(half_size),
        }
    }

    /// Detector layout: `[xmin, ymin, xmax, ymax]`.
    #[must_use]
    pub const fn to_corner_array(self) -> [i32; 4] {
        [self.xmin, self.ymin, self.xmax, self.ymax]
    }

    /// Eye-window layout: `[xmin, xmax, ymin, ymax]`.
    ///
    /// Downstream gaze estimators consume eye boxes in this order.
    #[must_use]
    pub const fn to_axis_array(self) -> [i32; 4] {
        [self.xmin, self.xmax, self.ymin, self.ymax]
    }

    /// Width in pixels, zero when the box is inverted.
    #[must_use]
    pub fn width(self) -> u32 {
        u32::try_from(self.xmax.saturating_sub(self.xmin)).unwrap_or(0)
    }

    /// Height in pixels, zero when the box is inverted.
    #[must_use]
    pub fn height(self) -> u32 {
        u32::try_from(self.ymax.saturating_sub(self.ymin)).unwrap_or(0)
    }

    /// Shifts the box by `(dx, dy)`, saturating at the `i32` range.
    #[must_use]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self {
            xmin: self.xmin.saturating_add(dx),
            ymin: self.ymin.saturating_add(dy),
            xmax: self.xmax.saturating_add(dx),
            ymax: self.ymax.saturating_add(dy),
        }
    }

    /// Intersection with the `width` x `height` image rectangle.
    ///
    /// Returns `(x, y, w, h)` suitable for cropping, or `None` when the box
    /// does not overlap the image.
    #[must_use]
    pub fn clamp_to(self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let w = i64::from(width);
        let h = i64::from(height);
        let x0 = i64::from(self.xmin).clamp(0, w);
        let y0 = i64::from(self.ymin).clamp(0, h);
        let x1 = i64::from(self.xmax).clamp(0, w);
        let y1 = i64::from(self.ymax).clamp(0, h);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        // All four values lie within 0..=u32::MAX after clamping.
        Some((
            u32::try_from(x0).ok()?,
            u32::try_from(y0).ok()?,
            u32::try_from(x1 - x0).ok()?,
            u32::try_from(y1 - y0).ok()?,
        ))
    }
}

/// A facial keypoint in normalized `[0, 1]` image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    /// Horizontal position, fraction of image width.
    pub x: f32,
    /// Vertical position, fraction of image height.
    pub y: f32,
}

impl LandmarkPoint {
    /// Creates a landmark from normalized coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Pixel position within a `width` x `height` image, truncated toward zero.
    #[must_use]
    pub fn to_pixel(self, width: u32, height: u32) -> (i32, i32) {
        (denormalize(self.x, width), denormalize(self.y, height))
    }
}

/// Image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDimensions {
    /// Creates dimensions from width and height.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Scales a normalized coordinate to pixels and truncates toward zero.
fn denormalize(value: f32, extent: u32) -> i32 {
    (f64::from(value) * f64::from(extent)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_around_saturates() {
        let center = LandmarkPoint::new(1e10, -1e10).to_pixel(100, 100);
        let bbox = BoundingBox::around(center, 20);
        assert_eq!(bbox.xmax, i32::MAX);
        assert_eq!(bbox.xmin, i32::MAX - 20);
        assert_eq!(bbox.ymin, i32::MIN);
        assert_eq!(bbox.clamp_to(100, 100), None);
    }

    #[test]
    fn test_translate_saturates() {
        let bbox = BoundingBox::new(0, 0, i32::MAX - 5, 10).translate(10, -10);
        assert_eq!(bbox.to_corner_array(), [10, -10, i32::MAX, 0]);
    }

    #[test]
    fn test_from_normalized_truncates() {
        let bbox = BoundingBox::from_normalized([0.1, 0.2, 0.3, 0.4], 640, 480);
        assert_eq!(bbox.to_corner_array(), [64, 96, 192, 192]);
    }

    #[test]
    fn test_around_axis_order() {
        let bbox = BoundingBox::around((100, 100), 20);
        assert_eq!(bbox.to_axis_array(), [80, 120, 80, 120]);
        assert_eq!(bbox.to_corner_array(), [80, 80, 120, 120]);
    }

    #[test]
    fn test_width_height() {
        let bbox = BoundingBox::new(10, 20, 50, 25);
        assert_eq!(bbox.width(), 40);
        assert_eq!(bbox.height(), 5);

        let inverted = BoundingBox::new(50, 20, 10, 25);
        assert_eq!(inverted.width(), 0);
    }

    #[test]
    fn test_clamp_inside() {
        let bbox = BoundingBox::new(10, 10, 30, 20);
        assert_eq!(bbox.clamp_to(100, 100), Some((10, 10, 20, 10)));
    }

    #[test]
    fn test_clamp_partial() {
        let bbox = BoundingBox::around((5, 50), 20);
        assert_eq!(bbox.clamp_to(100, 100), Some((0, 30, 25, 40)));
    }

    #[test]
    fn test_clamp_disjoint() {
        let bbox = BoundingBox::new(-40, -40, -1, -1);
        assert_eq!(bbox.clamp_to(100, 100), None);

        let beyond = BoundingBox::new(120, 10, 160, 50);
        assert_eq!(beyond.clamp_to(100, 100), None);
    }

    #[test]
    fn test_translate() {
        let bbox = BoundingBox::new(1, 2, 3, 4).translate(10, 20);
        assert_eq!(bbox, BoundingBox::new(11, 22, 13, 24));
    }

    #[test]
    fn test_landmark_to_pixel() {
        let point = LandmarkPoint::new(0.25, 0.5);
        assert_eq!(point.to_pixel(200, 100), (50, 50));
    }
}
