//! Inference backend port.
//!
//! The stages never talk to a concrete runtime. They load a network through
//! an [`InferenceBackend`] and run it through the returned [`LoadedModel`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use candle_core::Tensor;

/// Structure and weights files of one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    /// Network topology descriptor.
    pub structure: PathBuf,
    /// Weight blob.
    pub weights: PathBuf,
}

impl ModelFiles {
    /// Derives both paths from a common stem by appending extensions.
    ///
    /// The extensions are appended, not substituted, so a stem such as
    /// `face-detection-adas-0001` or `models/v1.2/landmarks` keeps every
    /// dot it already has.
    #[must_use]
    pub fn from_stem(stem: impl AsRef<Path>, structure_ext: &str, weights_ext: &str) -> Self {
        let stem = stem.as_ref().as_os_str();
        let with_ext = |ext: &str| {
            let mut path = stem.to_os_string();
            path.push(".");
            path.push(ext);
            PathBuf::from(path)
        };
        Self {
            structure: with_ext(structure_ext),
            weights: with_ext(weights_ext),
        }
    }

    /// Returns true if both files exist.
    #[must_use]
    pub fn exist(&self) -> bool {
        self.structure.is_file() && self.weights.is_file()
    }
}

/// Port for loading networks onto a compute device.
pub trait InferenceBackend {
    /// Loaded network handle.
    type Model: LoadedModel;

    /// Short backend identifier used in logs.
    fn name(&self) -> &'static str;

    /// Extensions of the structure and weights files, without the dot.
    fn file_extensions(&self) -> (&'static str, &'static str) {
        ("xml", "bin")
    }

    /// Model files for a stem, using this backend's extensions.
    fn model_files(&self, stem: &Path) -> ModelFiles {
        let (structure, weights) = self.file_extensions();
        ModelFiles::from_stem(stem, structure, weights)
    }

    /// Loads a network for the given device.
    ///
    /// `device` selects the compute target (for example `"CPU"` or
    /// `"GPU"`). `extension` names an optional plugin library that a
    /// backend may need for custom layers.
    ///
    /// # Errors
    ///
    /// Returns an error if the files are missing or corrupt, the device is
    /// unknown or unavailable, or the extension cannot be loaded.
    fn load_network(
        &self,
        files: &ModelFiles,
        device: &str,
        extension: Option<&Path>,
    ) -> anyhow::Result<Self::Model>;
}

/// A network bound to a device, ready for inference.
pub trait LoadedModel {
    /// Name of the network's (first) input.
    fn input_name(&self) -> &str;

    /// Declared input shape, `[1, C, H, W]` for image models.
    fn input_shape(&self) -> &[usize];

    /// Name of the network's (first) output.
    fn output_name(&self) -> &str;

    /// Runs inference on named inputs and returns named outputs.
    ///
    /// # Errors
    ///
    /// Returns an error if an input is missing or the runtime fails.
    fn infer(&self, inputs: HashMap<String, Tensor>) -> anyhow::Result<HashMap<String, Tensor>>;
}
