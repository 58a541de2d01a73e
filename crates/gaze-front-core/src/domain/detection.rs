//! Detection records emitted by detection-output style models.

#![allow(clippy::cast_possible_truncation)]

use serde::{Deserialize, Serialize};

use super::BoundingBox;

/// Number of fields in one detection-output row.
pub const DETECTION_RECORD_LEN: usize = 7;

/// One row of a detection-output tensor.
///
/// Layout: `[image_id, label, confidence, xmin, ymin, xmax, ymax]`, with
/// confidence and coordinates normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionRecord {
    /// Batch index reported by the model.
    pub image_id: f32,
    /// Class label predicted by the model.
    pub label: f32,
    /// Confidence score.
    pub confidence: f32,
    /// Normalized corners `[xmin, ymin, xmax, ymax]`.
    pub corners: [f32; 4],
}

impl DetectionRecord {
    /// Parses a 7-wide row.
    #[must_use]
    pub const fn from_row(row: &[f32; DETECTION_RECORD_LEN]) -> Self {
        Self {
            image_id: row[0],
            label: row[1],
            confidence: row[2],
            corners: [row[3], row[4], row[5], row[6]],
        }
    }
}

/// A face detection in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    /// Face box in pixels.
    pub bbox: BoundingBox,
    /// Class label reported by the model.
    pub label: i32,
    /// Detection confidence (0.0 to 1.0).
    pub confidence: f32,
}

impl FaceDetection {
    /// Denormalizes a record against the source image size.
    #[must_use]
    pub fn from_record(record: &DetectionRecord, width: u32, height: u32) -> Self {
        Self {
            bbox: BoundingBox::from_normalized(record.corners, width, height),
            label: record.label as i32,
            confidence: record.confidence,
        }
    }
}
