//! JSON network descriptors for the candle backend.
//!
//! A descriptor is the structure half of a model: it names the input and
//! output, declares the input shape, and lists the layers to run in order.
//! The weights live in a companion safetensors file and are looked up as
//! `<layer name>.weight` and `<layer name>.bias`.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Named tensor slot with an optional declared shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorSpec {
    /// Tensor name used in the inference request or response.
    pub name: String,
    /// Declared shape; required for inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<usize>>,
}

/// One layer of a sequential network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSpec {
    /// 2D convolution with bias.
    Conv2d {
        /// Weight prefix.
        name: String,
        /// Input channels.
        in_channels: usize,
        /// Output channels.
        out_channels: usize,
        /// Square kernel size.
        kernel_size: usize,
        /// Stride.
        #[serde(default = "one")]
        stride: usize,
        /// Zero padding on each side.
        #[serde(default)]
        padding: usize,
    },
    /// Fully connected layer with bias.
    Linear {
        /// Weight prefix.
        name: String,
        /// Input features.
        in_features: usize,
        /// Output features.
        out_features: usize,
    },
    /// Rectified linear unit.
    Relu,
    /// Logistic sigmoid.
    Sigmoid,
    /// Square max pooling with stride equal to the window.
    MaxPool2d {
        /// Window size.
        size: usize,
    },
    /// Flattens every dimension after the batch dimension.
    Flatten,
    /// Reshapes to a fixed shape.
    Reshape {
        /// Target shape; its element count must match the input's.
        shape: Vec<usize>,
    },
}

const fn one() -> usize {
    1
}

/// Parsed network descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    /// Human-readable network name.
    #[serde(default)]
    pub name: String,
    /// Network input.
    pub input: TensorSpec,
    /// Network output.
    pub output: TensorSpec,
    /// Layers, applied in order.
    pub layers: Vec<LayerSpec>,
}

impl NetworkDescriptor {
    /// Reads and validates a descriptor file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails
    /// [`Self::validate`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read network descriptor: {}", path.display()))?;
        let descriptor: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse network descriptor: {}", path.display()))?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Returns the declared input shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the input has no declared shape.
    pub fn input_shape(&self) -> Result<&[usize]> {
        self.input
            .shape
            .as_deref()
            .with_context(|| format!("Input '{}' has no declared shape", self.input.name))
    }

    /// Checks the descriptor for structural problems that would only
    /// surface at inference time otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.input.name.is_empty() || self.output.name.is_empty() {
            bail!("Input and output names must not be empty");
        }

        let shape = self.input_shape()?;
        if shape.is_empty() || shape.contains(&0) {
            bail!("Input shape {shape:?} must be non-empty with non-zero dimensions");
        }

        if self.layers.is_empty() {
            bail!("Network has no layers");
        }

        for (index, layer) in self.layers.iter().enumerate() {
            match layer {
                LayerSpec::Conv2d {
                    name,
                    in_channels,
                    out_channels,
                    kernel_size,
                    stride,
                    ..
                } => {
                    if name.is_empty() {
                        bail!("Layer {index}: conv2d needs a weight name");
                    }
                    if *in_channels == 0 || *out_channels == 0 || *kernel_size == 0 || *stride == 0
                    {
                        bail!("Layer {index}: conv2d dimensions must be non-zero");
                    }
                }
                LayerSpec::Linear {
                    name,
                    in_features,
                    out_features,
                } => {
                    if name.is_empty() {
                        bail!("Layer {index}: linear needs a weight name");
                    }
                    if *in_features == 0 || *out_features == 0 {
                        bail!("Layer {index}: linear dimensions must be non-zero");
                    }
                }
                LayerSpec::MaxPool2d { size } if *size == 0 => {
                    bail!("Layer {index}: max_pool2d size must be non-zero");
                }
                LayerSpec::Reshape { shape } if shape.is_empty() => {
                    bail!("Layer {index}: reshape needs a target shape");
                }
                _ => {}
            }
        }

        Ok(())
    }
}
