//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the stages and external
//! adapters: the inference runtime, where frames come from, and where
//! results go.

mod backend;
mod image_source;
mod result_output;

pub use backend::{InferenceBackend, LoadedModel, ModelFiles};
pub use image_source::ImageSource;
pub use result_output::ResultOutput;
