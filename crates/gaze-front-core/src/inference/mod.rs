//! Inference plumbing: devices, weights, tensors and the candle backend.

mod candle_backend;
mod descriptor;
mod device;
mod loader;
mod tensor;

pub use candle_backend::{CandleBackend, SequentialNetwork};
pub use descriptor::{LayerSpec, NetworkDescriptor, TensorSpec};
pub use device::{get_device, parse_device};
pub use loader::load_safetensors;
pub use tensor::{image_to_tensor, tensor_values, ChannelOrder};
