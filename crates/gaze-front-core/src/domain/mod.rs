//! Core domain types for the gaze front-end.

mod detection;
mod geometry;
mod image_info;
mod result;

pub use detection::{DetectionRecord, FaceDetection, DETECTION_RECORD_LEN};
pub use geometry::{BoundingBox, ImageDimensions, LandmarkPoint};
pub use image_info::ImageInfo;
pub use result::{EyeRecord, FaceRecord, FrameResult};
