//! Gaze Front Adapters - filesystem adapters for gaze-front.
//!
//! This crate provides adapters for:
//! - Loading frames from files and directories
//! - Locating models in the models directory

pub mod fs;
pub mod models;

pub use fs::FsImageSource;
pub use models::{list_models, model_stem, models_dir, resolve_model, ModelStatus, MODELS};
