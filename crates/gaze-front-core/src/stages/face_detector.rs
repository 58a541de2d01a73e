//! Face detection stage.
//!
//! Wraps a detection-output style model: one `(1, 1, N, 7)` tensor whose
//! rows are `[image_id, label, confidence, xmin, ymin, xmax, ymax]`. Rows
//! are filtered by confidence and denormalized; the backend is trusted to
//! have suppressed overlapping boxes already.

use std::path::Path;

use candle_core::Tensor;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, error};

use super::runtime::{ModelSettings, StageRuntime};
use crate::domain::{BoundingBox, DetectionRecord, FaceDetection, DETECTION_RECORD_LEN};
use crate::error::{Error, Result};
use crate::inference::{tensor_values, ChannelOrder};
use crate::ports::InferenceBackend;

/// Default minimum confidence for a face to be reported.
pub const DEFAULT_FACE_THRESHOLD: f32 = 0.5;

/// Configuration for the face detection stage.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDetectorConfig {
    /// Model location and device.
    pub model: ModelSettings,
    /// Minimum confidence, inclusive, in `[0, 1]`.
    pub threshold: f32,
    /// Channel order of the model input.
    pub channel_order: ChannelOrder,
}

impl FaceDetectorConfig {
    /// Configuration for the model at `stem` with default device and threshold.
    #[must_use]
    pub fn new(stem: impl AsRef<Path>) -> Self {
        Self {
            model: ModelSettings::new(stem),
            threshold: DEFAULT_FACE_THRESHOLD,
            channel_order: ChannelOrder::default(),
        }
    }

    /// Sets the compute device.
    #[must_use]
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.model.device = device.into();
        self
    }

    /// Sets the backend plugin extension.
    #[must_use]
    pub fn with_extension(mut self, path: impl AsRef<Path>) -> Self {
        self.model.extension = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the confidence threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the input channel order.
    #[must_use]
    pub const fn with_channel_order(mut self, order: ChannelOrder) -> Self {
        self.channel_order = order;
        self
    }

    /// Checks parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the threshold is outside `[0, 1]` (or
    /// NaN) or the model settings are empty.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::Config(format!(
                "face threshold must be 0.0-1.0, got {}",
                self.threshold
            )));
        }
        self.model.validate()
    }
}

/// Face detection stage bound to an inference backend.
pub struct FaceDetector<B: InferenceBackend> {
    runtime: StageRuntime<B>,
    threshold: f32,
    channel_order: ChannelOrder,
}

impl<B: InferenceBackend> FaceDetector<B> {
    /// Configures a detector. The model is not loaded until [`Self::load`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn new(backend: B, config: FaceDetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            runtime: StageRuntime::new(backend, config.model),
            threshold: config.threshold,
            channel_order: config.channel_order,
        })
    }

    /// Replaces the configuration and returns the stage to the unloaded
    /// state. This is the only way out of a failed load.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid; the stage
    /// is left unchanged in that case.
    pub fn reconfigure(&mut self, config: FaceDetectorConfig) -> Result<()> {
        config.validate()?;
        self.runtime.reconfigure(config.model);
        self.threshold = config.threshold;
        self.channel_order = config.channel_order;
        Ok(())
    }

    /// Loads the model onto the configured device.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Load`] if the backend fails, if the model is already
    /// loaded, or if an earlier load failed and the stage was not
    /// reconfigured since.
    pub fn load(&mut self) -> Result<()> {
        self.runtime.load()
    }

    /// Returns true once [`Self::load`] has succeeded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.runtime.is_loaded()
    }

    /// Returns the confidence threshold.
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Returns the model settings.
    #[must_use]
    pub const fn model_settings(&self) -> &ModelSettings {
        self.runtime.settings()
    }

    /// Detects faces and returns their pixel boxes in model output order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoaded`] before a successful load,
    /// [`Error::Shape`] for images with fewer than three channels or a
    /// malformed output tensor, and [`Error::Inference`] if the backend
    /// fails.
    pub fn predict(&self, image: &DynamicImage) -> Result<Vec<BoundingBox>> {
        Ok(self
            .predict_detections(image)?
            .into_iter()
            .map(|face| face.bbox)
            .collect())
    }

    /// Like [`Self::predict`], keeping label and confidence for each face.
    ///
    /// # Errors
    ///
    /// Same as [`Self::predict`].
    pub fn predict_detections(&self, image: &DynamicImage) -> Result<Vec<FaceDetection>> {
        let output = self.runtime.run(image, self.channel_order)?;
        let (width, height) = image.dimensions();
        let faces = decode_detections(&output, width, height, self.threshold)?;
        debug!("Found {} face(s) at threshold {}", faces.len(), self.threshold);
        Ok(faces)
    }

    /// Model compatibility check. Not implemented.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::NotImplemented`].
    pub fn check_model(&self) -> Result<()> {
        error!(
            "check_model called for {} but no model check exists",
            self.runtime.settings().stem.display()
        );
        Err(Error::NotImplemented("face model check"))
    }
}

/// Converts a detection-output tensor into pixel-space faces.
///
/// Keeps every row with `confidence >= threshold`, in tensor order. The
/// `image_id` field is not consulted.
///
/// # Errors
///
/// Returns [`Error::Shape`] if the tensor's last dimension is not 7.
pub fn decode_detections(
    output: &Tensor,
    width: u32,
    height: u32,
    threshold: f32,
) -> Result<Vec<FaceDetection>> {
    if output.dims().last() != Some(&DETECTION_RECORD_LEN) {
        return Err(Error::Shape(format!(
            "detection output shape {:?} does not end in {DETECTION_RECORD_LEN}",
            output.dims()
        )));
    }

    let values = tensor_values(output)?;
    Ok(filter_records(&values, width, height, threshold))
}

fn filter_records(values: &[f32], width: u32, height: u32, threshold: f32) -> Vec<FaceDetection> {
    values
        .chunks_exact(DETECTION_RECORD_LEN)
        .filter_map(|row| <&[f32; DETECTION_RECORD_LEN]>::try_from(row).ok())
        .map(DetectionRecord::from_row)
        .filter(|record| record.confidence >= threshold)
        .map(|record| FaceDetection::from_record(&record, width, height))
        .collect()
}
