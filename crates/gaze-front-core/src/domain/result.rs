//! Serializable per-frame results.

use serde::{Deserialize, Serialize};

use super::{ImageDimensions, LandmarkPoint};

/// Front-end result for a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    /// Path of the analyzed frame.
    pub path: String,
    /// Frame dimensions.
    pub dimensions: ImageDimensions,
    /// One entry per face, in detector order.
    pub faces: Vec<FaceRecord>,
}

/// One face and its eyes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRecord {
    /// Face box `[xmin, ymin, xmax, ymax]` in frame pixels.
    pub bbox: [i32; 4],
    /// Detection confidence.
    pub confidence: f32,
    /// Left eye.
    pub left_eye: EyeRecord,
    /// Right eye.
    pub right_eye: EyeRecord,
}

/// One eye window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EyeRecord {
    /// Eye box `[xmin, xmax, ymin, ymax]` in frame pixels.
    pub bbox: [i32; 4],
    /// Eye center, normalized to the face crop.
    pub landmark: LandmarkPoint,
    /// Size `[width, height]` of the clamped eye crop.
    pub crop_size: [u32; 2],
}
