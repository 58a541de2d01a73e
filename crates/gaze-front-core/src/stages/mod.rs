//! Inference stages of the front-end.
//!
//! Each stage owns one model handle and follows the same lifecycle:
//! configure, [`load`](FaceDetector::load) once, then `predict` any number
//! of times.

mod crop;
mod face_detector;
mod landmark_locator;
mod runtime;

pub use crop::crop_clamped;
pub use face_detector::{
    decode_detections, FaceDetector, FaceDetectorConfig, DEFAULT_FACE_THRESHOLD,
};
pub use landmark_locator::{
    decode_eye_landmarks, eye_window, EyeCrops, LandmarkConfig, LandmarkLocator,
    DEFAULT_EYE_HALF_WINDOW,
};
pub use runtime::{ModelSettings, DEFAULT_DEVICE};
