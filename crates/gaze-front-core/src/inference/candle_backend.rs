//! Candle-based inference backend.
//!
//! Executes sequential networks described by a JSON descriptor (see
//! [`NetworkDescriptor`]) with weights from a safetensors blob. Model files
//! are `<stem>.json` and `<stem>.safetensors`.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{conv2d, linear, Conv2d, Conv2dConfig, Linear, VarBuilder};
use tracing::{debug, info};

use super::descriptor::{LayerSpec, NetworkDescriptor};
use super::{load_safetensors, parse_device};
use crate::ports::{InferenceBackend, LoadedModel, ModelFiles};

/// Inference backend running sequential networks on candle.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandleBackend;

impl CandleBackend {
    /// Creates the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl InferenceBackend for CandleBackend {
    type Model = SequentialNetwork;

    fn name(&self) -> &'static str {
        "candle"
    }

    fn file_extensions(&self) -> (&'static str, &'static str) {
        ("json", "safetensors")
    }

    fn load_network(
        &self,
        files: &ModelFiles,
        device: &str,
        extension: Option<&Path>,
    ) -> Result<SequentialNetwork> {
        if let Some(extension) = extension {
            bail!(
                "The candle backend does not load plugin extensions ({})",
                extension.display()
            );
        }

        let device = parse_device(device)?;
        let descriptor = NetworkDescriptor::from_file(&files.structure)?;
        let vb = load_safetensors(&files.weights, &device)
            .context("Failed to load network weights")?;

        let network = SequentialNetwork::new(descriptor, &vb, device)?;
        info!(
            "Loaded network '{}' ({} layers) from {}",
            network.descriptor.name,
            network.layers.len(),
            files.structure.display()
        );
        Ok(network)
    }
}

/// A layer with its weights bound.
#[derive(Debug)]
enum Layer {
    Conv2d(Conv2d),
    Linear(Linear),
    Relu,
    Sigmoid,
    MaxPool2d(usize),
    Flatten,
    Reshape(Vec<usize>),
}

impl Layer {
    fn build(spec: &LayerSpec, vb: &VarBuilder) -> Result<Self> {
        let layer = match spec {
            LayerSpec::Conv2d {
                name,
                in_channels,
                out_channels,
                kernel_size,
                stride,
                padding,
            } => Self::Conv2d(
                conv2d(
                    *in_channels,
                    *out_channels,
                    *kernel_size,
                    Conv2dConfig {
                        stride: *stride,
                        padding: *padding,
                        ..Conv2dConfig::default()
                    },
                    vb.pp(name),
                )
                .with_context(|| format!("Missing or malformed weights for conv2d '{name}'"))?,
            ),
            LayerSpec::Linear {
                name,
                in_features,
                out_features,
            } => Self::Linear(
                linear(*in_features, *out_features, vb.pp(name))
                    .with_context(|| format!("Missing or malformed weights for linear '{name}'"))?,
            ),
            LayerSpec::Relu => Self::Relu,
            LayerSpec::Sigmoid => Self::Sigmoid,
            LayerSpec::MaxPool2d { size } => Self::MaxPool2d(*size),
            LayerSpec::Flatten => Self::Flatten,
            LayerSpec::Reshape { shape } => Self::Reshape(shape.clone()),
        };
        Ok(layer)
    }
}

impl Module for Layer {
    fn forward(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Self::Conv2d(conv) => conv.forward(x),
            Self::Linear(fc) => fc.forward(x),
            Self::Relu => x.relu(),
            Self::Sigmoid => candle_nn::ops::sigmoid(x),
            Self::MaxPool2d(size) => x.max_pool2d(*size),
            Self::Flatten => x.flatten_from(1),
            Self::Reshape(shape) => x.reshape(shape.as_slice()),
        }
    }
}

/// A loaded sequential network bound to a device.
#[derive(Debug)]
pub struct SequentialNetwork {
    descriptor: NetworkDescriptor,
    input_shape: Vec<usize>,
    layers: Vec<Layer>,
    device: Device,
}

impl SequentialNetwork {
    /// Binds descriptor layers to weights and checks that the network runs
    /// on an input of the declared shape.
    ///
    /// # Errors
    ///
    /// Returns an error if weights are missing or have the wrong shape, or
    /// if the layers do not compose for the declared input.
    pub fn new(descriptor: NetworkDescriptor, vb: &VarBuilder, device: Device) -> Result<Self> {
        let input_shape = descriptor.input_shape()?.to_vec();
        let layers = descriptor
            .layers
            .iter()
            .map(|spec| Layer::build(spec, vb))
            .collect::<Result<Vec<_>>>()?;

        let network = Self {
            descriptor,
            input_shape,
            layers,
            device,
        };

        let probe = Tensor::zeros(network.input_shape.as_slice(), DType::F32, &network.device)?;
        let output = network
            .forward(&probe)
            .context("Network does not run on its declared input shape")?;
        debug!(
            "Network '{}' maps {:?} to {:?}",
            network.descriptor.name,
            network.input_shape,
            output.dims()
        );

        Ok(network)
    }

    /// Returns the descriptor this network was built from.
    #[must_use]
    pub const fn descriptor(&self) -> &NetworkDescriptor {
        &self.descriptor
    }

    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let mut h = x.clone();
        for (index, layer) in self.layers.iter().enumerate() {
            h = layer
                .forward(&h)
                .with_context(|| format!("Layer {index} failed"))?;
        }
        Ok(h)
    }
}

impl LoadedModel for SequentialNetwork {
    fn input_name(&self) -> &str {
        &self.descriptor.input.name
    }

    fn input_shape(&self) -> &[usize] {
        &self.input_shape
    }

    fn output_name(&self) -> &str {
        &self.descriptor.output.name
    }

    fn infer(&self, mut inputs: HashMap<String, Tensor>) -> Result<HashMap<String, Tensor>> {
        let input = inputs
            .remove(self.input_name())
            .with_context(|| format!("Missing input '{}'", self.input_name()))?;

        if input.dims() != self.input_shape.as_slice() {
            bail!(
                "Input '{}' has shape {:?}, expected {:?}",
                self.input_name(),
                input.dims(),
                self.input_shape
            );
        }

        let input = input.to_dtype(DType::F32)?.to_device(&self.device)?;
        let output = self.forward(&input)?.to_device(&Device::Cpu)?;

        Ok(HashMap::from([(self.output_name().to_string(), output)]))
    }
}
