//! Model lifecycle shared by the inference stages.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use candle_core::Tensor;
use image::DynamicImage;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::inference::{image_to_tensor, ChannelOrder};
use crate::ports::{InferenceBackend, LoadedModel};

/// Default compute device.
pub const DEFAULT_DEVICE: &str = "CPU";

/// Where a stage's model lives and where it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    /// Path stem; the backend appends its structure and weights extensions.
    pub stem: PathBuf,
    /// Compute device, for example `"CPU"` or `"GPU"`.
    pub device: String,
    /// Optional backend plugin library.
    pub extension: Option<PathBuf>,
}

impl ModelSettings {
    /// Settings for `stem` on the default device, without extension.
    #[must_use]
    pub fn new(stem: impl AsRef<Path>) -> Self {
        Self {
            stem: stem.as_ref().to_path_buf(),
            device: DEFAULT_DEVICE.to_string(),
            extension: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.stem.as_os_str().is_empty() {
            return Err(Error::Config("model path must not be empty".into()));
        }
        if self.device.trim().is_empty() {
            return Err(Error::Config("device must not be empty".into()));
        }
        Ok(())
    }

    fn label(&self) -> String {
        self.stem.display().to_string()
    }
}

/// Lifecycle of a stage's model handle.
enum ModelState<M> {
    Unloaded,
    Loaded(M),
    Failed(String),
}

/// Backend, settings and model handle of one stage.
pub(crate) struct StageRuntime<B: InferenceBackend> {
    backend: B,
    settings: ModelSettings,
    state: ModelState<B::Model>,
}

impl<B: InferenceBackend> StageRuntime<B> {
    pub(crate) const fn new(backend: B, settings: ModelSettings) -> Self {
        Self {
            backend,
            settings,
            state: ModelState::Unloaded,
        }
    }

    pub(crate) const fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub(crate) const fn is_loaded(&self) -> bool {
        matches!(self.state, ModelState::Loaded(_))
    }

    /// Replaces the settings and drops any model handle.
    pub(crate) fn reconfigure(&mut self, settings: ModelSettings) {
        self.settings = settings;
        self.state = ModelState::Unloaded;
    }

    pub(crate) fn load(&mut self) -> Result<()> {
        match &self.state {
            ModelState::Unloaded => {}
            ModelState::Loaded(_) => {
                return Err(Error::load(
                    self.settings.label(),
                    anyhow::anyhow!("model is already loaded"),
                ));
            }
            ModelState::Failed(reason) => {
                return Err(Error::load(
                    self.settings.label(),
                    anyhow::anyhow!("an earlier load failed ({reason}); reconfigure first"),
                ));
            }
        }

        let files = self.backend.model_files(&self.settings.stem);
        debug!(
            "Loading {} + {} with the {} backend",
            files.structure.display(),
            files.weights.display(),
            self.backend.name()
        );

        match self.backend.load_network(
            &files,
            &self.settings.device,
            self.settings.extension.as_deref(),
        ) {
            Ok(model) => {
                info!(
                    "Loaded {} on {} (input '{}' {:?}, output '{}')",
                    self.settings.label(),
                    self.settings.device,
                    model.input_name(),
                    model.input_shape(),
                    model.output_name()
                );
                self.state = ModelState::Loaded(model);
                Ok(())
            }
            Err(source) => {
                self.state = ModelState::Failed(format!("{source:#}"));
                Err(Error::load(self.settings.label(), source))
            }
        }
    }

    fn model(&self) -> Result<&B::Model> {
        match &self.state {
            ModelState::Loaded(model) => Ok(model),
            ModelState::Unloaded | ModelState::Failed(_) => Err(Error::NotLoaded),
        }
    }

    /// Preprocesses `image`, runs the model and returns its named output.
    pub(crate) fn run(&self, image: &DynamicImage, order: ChannelOrder) -> Result<Tensor> {
        let model = self.model()?;
        let input = image_to_tensor(image, model.input_shape(), order)?;

        let inputs = HashMap::from([(model.input_name().to_string(), input)]);
        let mut outputs = model.infer(inputs).map_err(Error::Inference)?;

        outputs.remove(model.output_name()).ok_or_else(|| {
            Error::Shape(format!(
                "backend returned no '{}' output",
                model.output_name()
            ))
        })
    }
}
