//! Mock implementations of core port traits.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use candle_core::Tensor;
use gaze_front_core::domain::{FrameResult, ImageInfo};
use gaze_front_core::ports::{
    ImageSource, InferenceBackend, LoadedModel, ModelFiles, ResultOutput,
};

/// A recorded `load_network` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadCall {
    /// Files the stage asked for.
    pub files: ModelFiles,
    /// Requested device.
    pub device: String,
    /// Requested plugin extension.
    pub extension: Option<PathBuf>,
}

#[derive(Default)]
struct CallLog {
    loads: Mutex<Vec<LoadCall>>,
    inputs: Mutex<Vec<Tensor>>,
}

/// Mock implementation of `InferenceBackend` for testing.
///
/// Every loaded model returns the same scripted output tensor. Clones share
/// their call log, so a test can keep a clone after handing the backend to
/// a stage.
#[derive(Clone)]
pub struct MockBackend {
    input_shape: Vec<usize>,
    output_name: String,
    output: Tensor,
    rejected_devices: Vec<String>,
    inference_error: Option<String>,
    calls: Arc<CallLog>,
}

impl MockBackend {
    /// Input name declared by mock models.
    pub const INPUT_NAME: &'static str = "data";

    /// Creates a backend whose models declare `input_shape` and always
    /// return `output`.
    #[must_use]
    pub fn new(input_shape: &[usize], output: Tensor) -> Self {
        Self {
            input_shape: input_shape.to_vec(),
            output_name: "output".into(),
            output,
            rejected_devices: Vec::new(),
            inference_error: None,
            calls: Arc::default(),
        }
    }

    /// Makes `load_network` fail for `device`.
    #[must_use]
    pub fn rejecting_device(mut self, device: &str) -> Self {
        self.rejected_devices.push(device.to_string());
        self
    }

    /// Makes every `infer` call fail with `message`.
    #[must_use]
    pub fn failing_inference(mut self, message: &str) -> Self {
        self.inference_error = Some(message.to_string());
        self
    }

    /// Renames the model output.
    #[must_use]
    pub fn with_output_name(mut self, name: &str) -> Self {
        self.output_name = name.to_string();
        self
    }

    /// Returns every `load_network` call so far.
    #[must_use]
    pub fn load_calls(&self) -> Vec<LoadCall> {
        self.calls
            .loads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns every input tensor passed to `infer` so far.
    #[must_use]
    pub fn inputs(&self) -> Vec<Tensor> {
        self.calls
            .inputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `infer` calls so far.
    #[must_use]
    pub fn infer_count(&self) -> usize {
        self.calls
            .inputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl InferenceBackend for MockBackend {
    type Model = MockModel;

    fn name(&self) -> &'static str {
        "mock"
    }

    fn load_network(
        &self,
        files: &ModelFiles,
        device: &str,
        extension: Option<&Path>,
    ) -> anyhow::Result<MockModel> {
        self.calls
            .loads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LoadCall {
                files: files.clone(),
                device: device.to_string(),
                extension: extension.map(Path::to_path_buf),
            });

        if self.rejected_devices.iter().any(|d| d == device) {
            anyhow::bail!("device '{device}' is not available");
        }

        Ok(MockModel {
            backend: self.clone(),
        })
    }
}

/// Model handle returned by [`MockBackend`].
pub struct MockModel {
    backend: MockBackend,
}

impl LoadedModel for MockModel {
    fn input_name(&self) -> &str {
        MockBackend::INPUT_NAME
    }

    fn input_shape(&self) -> &[usize] {
        &self.backend.input_shape
    }

    fn output_name(&self) -> &str {
        &self.backend.output_name
    }

    fn infer(&self, mut inputs: HashMap<String, Tensor>) -> anyhow::Result<HashMap<String, Tensor>> {
        let input = inputs
            .remove(MockBackend::INPUT_NAME)
            .ok_or_else(|| anyhow::anyhow!("missing input '{}'", MockBackend::INPUT_NAME))?;
        self.backend
            .calls
            .inputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(input);

        if let Some(message) = &self.backend.inference_error {
            anyhow::bail!("{message}");
        }

        Ok(HashMap::from([(
            self.backend.output_name.clone(),
            self.backend.output.clone(),
        )]))
    }
}

/// Mock implementation of `ImageSource` for testing.
pub struct MockImageSource {
    images: Vec<ImageInfo>,
}

impl MockImageSource {
    /// Creates a new mock source with the given images.
    #[must_use]
    pub const fn new(images: Vec<ImageInfo>) -> Self {
        Self { images }
    }
}

impl ImageSource for MockImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<ImageInfo>> + Send + '_> {
        Box::new(self.images.iter().cloned().map(Ok))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.images.len())
    }
}

/// Mock implementation of `ResultOutput` for testing.
///
/// Captures results for later assertions.
#[derive(Default)]
pub struct MockResultOutput {
    results: Mutex<Vec<FrameResult>>,
    flush_count: Mutex<usize>,
}

impl MockResultOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured results.
    #[must_use]
    pub fn results(&self) -> Vec<FrameResult> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, result: &FrameResult) -> anyhow::Result<()> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
