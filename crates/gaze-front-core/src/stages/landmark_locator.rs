//! Eye landmark stage.
//!
//! Wraps a landmark regression model whose output starts with
//! `[left_x, left_y, right_x, right_y]` in normalized face coordinates, and
//! cuts a fixed-size window around each eye.

use std::path::Path;

use candle_core::Tensor;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, error};

use super::crop::crop_clamped;
use super::runtime::{ModelSettings, StageRuntime};
use crate::domain::{BoundingBox, LandmarkPoint};
use crate::error::{Error, Result};
use crate::inference::{tensor_values, ChannelOrder};
use crate::ports::InferenceBackend;

/// Default half-size of the eye window, in pixels.
pub const DEFAULT_EYE_HALF_WINDOW: i32 = 20;

/// Number of leading output values holding the two eye centers.
const EYE_VALUES: usize = 4;

/// Configuration for the landmark stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandmarkConfig {
    /// Model location and device.
    pub model: ModelSettings,
    /// Half-size of the square eye window, in pixels.
    pub eye_half_window: i32,
    /// Channel order of the model input.
    pub channel_order: ChannelOrder,
}

impl LandmarkConfig {
    /// Configuration for the model at `stem` with default device and window.
    #[must_use]
    pub fn new(stem: impl AsRef<Path>) -> Self {
        Self {
            model: ModelSettings::new(stem),
            eye_half_window: DEFAULT_EYE_HALF_WINDOW,
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

    /// Sets the eye window half-size.
    #[must_use]
    pub const fn with_eye_half_window(mut self, half_window: i32) -> Self {
        self.eye_half_window = half_window;
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
    /// Returns [`Error::Config`] if the eye window is not positive or the
    /// model settings are empty.
    pub fn validate(&self) -> Result<()> {
        if self.eye_half_window <= 0 {
            return Err(Error::Config(format!(
                "eye window must be positive, got {}",
                self.eye_half_window
            )));
        }
        self.model.validate()
    }
}

/// Eye crops cut from a face image.
#[derive(Debug, Clone)]
pub struct EyeCrops {
    /// Left eye region; empty when the window misses the face image.
    pub left: DynamicImage,
    /// Right eye region; empty when the window misses the face image.
    pub right: DynamicImage,
    /// Eye windows `[left, right]` in face-image pixels, before clamping.
    pub boxes: [BoundingBox; 2],
    /// Eye centers `[left, right]` in normalized face coordinates.
    pub landmarks: [LandmarkPoint; 2],
}

impl EyeCrops {
    /// Eye boxes in `[xmin, xmax, ymin, ymax]` layout, `[left, right]`.
    #[must_use]
    pub const fn axis_boxes(&self) -> [[i32; 4]; 2] {
        [self.boxes[0].to_axis_array(), self.boxes[1].to_axis_array()]
    }
}

/// Eye landmark stage bound to an inference backend.
pub struct LandmarkLocator<B: InferenceBackend> {
    runtime: StageRuntime<B>,
    eye_half_window: i32,
    channel_order: ChannelOrder,
}

impl<B: InferenceBackend> LandmarkLocator<B> {
    /// Configures a locator. The model is not loaded until [`Self::load`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn new(backend: B, config: LandmarkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            runtime: StageRuntime::new(backend, config.model),
            eye_half_window: config.eye_half_window,
            channel_order: config.channel_order,
        })
    }

    /// Replaces the configuration and returns the stage to the unloaded
    /// state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid; the stage
    /// is left unchanged in that case.
    pub fn reconfigure(&mut self, config: LandmarkConfig) -> Result<()> {
        config.validate()?;
        self.runtime.reconfigure(config.model);
        self.eye_half_window = config.eye_half_window;
        self.channel_order = config.channel_order;
        Ok(())
    }

    /// Loads the model onto the configured device.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Load`] under the same conditions as
    /// [`super::FaceDetector::load`].
    pub fn load(&mut self) -> Result<()> {
        self.runtime.load()
    }

    /// Returns true once [`Self::load`] has succeeded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.runtime.is_loaded()
    }

    /// Returns the eye window half-size.
    #[must_use]
    pub const fn eye_half_window(&self) -> i32 {
        self.eye_half_window
    }

    /// Returns the model settings.
    #[must_use]
    pub const fn model_settings(&self) -> &ModelSettings {
        self.runtime.settings()
    }

    /// Locates both eyes in a face image and crops a window around each.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoaded`] before a successful load,
    /// [`Error::Shape`] for images with fewer than three channels or an
    /// output with fewer than four values, and [`Error::Inference`] if the
    /// backend fails.
    pub fn predict(&self, face: &DynamicImage) -> Result<EyeCrops> {
        let output = self.runtime.run(face, self.channel_order)?;
        let landmarks = decode_eye_landmarks(&output)?;
        let (width, height) = face.dimensions();

        let [left_box, right_box] =
            landmarks.map(|point| eye_window(point, width, height, self.eye_half_window));
        debug!(
            "Eye windows in {width}x{height} face: left {:?}, right {:?}",
            left_box.to_axis_array(),
            right_box.to_axis_array()
        );

        Ok(EyeCrops {
            left: crop_clamped(face, left_box),
            right: crop_clamped(face, right_box),
            boxes: [left_box, right_box],
            landmarks,
        })
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
        Err(Error::NotImplemented("landmark model check"))
    }
}

/// Reads `[left, right]` eye centers from the first four output values.
///
/// # Errors
///
/// Returns [`Error::Shape`] if the output holds fewer than four values.
pub fn decode_eye_landmarks(output: &Tensor) -> Result<[LandmarkPoint; 2]> {
    let values = tensor_values(output)?;
    match values.get(..EYE_VALUES) {
        Some(&[left_x, left_y, right_x, right_y]) => Ok([
            LandmarkPoint::new(left_x, left_y),
            LandmarkPoint::new(right_x, right_y),
        ]),
        _ => Err(Error::Shape(format!(
            "landmark output has {} value(s), at least {EYE_VALUES} are required",
            values.len()
        ))),
    }
}

/// Square window of `half_window` pixels around a normalized eye center.
#[must_use]
pub fn eye_window(point: LandmarkPoint, width: u32, height: u32, half_window: i32) -> BoundingBox {
    BoundingBox::around(point.to_pixel(width, height), half_window)
}
