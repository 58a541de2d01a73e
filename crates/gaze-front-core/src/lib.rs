//! Gaze Front Core - face and eye stages of a gaze-estimation pipeline
//!
//! The stages turn frames into tensors, run them through an
//! [`InferenceBackend`], and turn the output tensors back into geometry:
//!
//! - [`FaceDetector`]: frame in, face boxes above a confidence threshold out.
//! - [`LandmarkLocator`]: face crop in, eye crops and eye boxes out.
//! - [`GazeFrontEnd`]: both stages chained, ready for a gaze estimator.
//!
//! [`CandleBackend`] runs sequential networks described in JSON with
//! safetensors weights; any other runtime plugs in through the
//! [`InferenceBackend`] and [`LoadedModel`] traits.

pub mod domain;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod ports;
pub mod stages;

pub use domain::{
    BoundingBox, DetectionRecord, EyeRecord, FaceDetection, FaceRecord, FrameResult,
    ImageDimensions, ImageInfo, LandmarkPoint,
};
pub use error::{Error, Result};
pub use inference::{CandleBackend, ChannelOrder};
pub use pipeline::{FaceEyes, GazeFrontEnd};
pub use ports::{ImageSource, InferenceBackend, LoadedModel, ModelFiles, ResultOutput};
pub use stages::{
    EyeCrops, FaceDetector, FaceDetectorConfig, LandmarkConfig, LandmarkLocator, ModelSettings,
};
