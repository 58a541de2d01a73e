//! Model directory adapter.
//!
//! Models are stored as `<stem>.json` + `<stem>.safetensors` pairs, the
//! layout the candle backend loads. Nothing is downloaded; models are
//! placed in the directory by hand.

use std::path::{Path, PathBuf};

use gaze_front_core::{CandleBackend, InferenceBackend};

/// Model metadata.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model name/identifier.
    pub name: &'static str,
    /// File stem in the models directory.
    pub stem: &'static str,
    /// What the model does.
    pub description: &'static str,
}

/// Known models.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        name: "face-detection",
        stem: "face-detection",
        description: "Face detector with a (1, 1, N, 7) detection output",
    },
    ModelInfo {
        name: "landmarks",
        stem: "landmarks-regression",
        description: "Facial landmark regressor, eyes first",
    },
];

/// Installation status of one known model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStatus {
    /// Model name.
    pub name: &'static str,
    /// Stem the files are expected at.
    pub stem: PathBuf,
    /// Whether both structure and weights files exist.
    pub installed: bool,
}

/// Returns the default models directory path.
///
/// Uses `XDG_DATA_HOME/gaze-front/models` or `~/.local/share/gaze-front/models`.
#[must_use]
pub fn models_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gaze-front")
        .join("models")
}

/// Returns the stem of a known model inside `dir`.
#[must_use]
pub fn model_stem(dir: &Path, name: &str) -> Option<PathBuf> {
    MODELS
        .iter()
        .find(|m| m.name == name)
        .map(|m| dir.join(m.stem))
}

/// Resolves a model argument: a known model name maps into `dir`, anything
/// else is taken as a path stem.
#[must_use]
pub fn resolve_model(dir: &Path, value: &str) -> PathBuf {
    model_stem(dir, value).unwrap_or_else(|| PathBuf::from(value))
}

/// Lists known models with their status in `dir`.
#[must_use]
pub fn list_models(dir: &Path) -> Vec<ModelStatus> {
    let backend = CandleBackend::new();
    MODELS
        .iter()
        .map(|m| {
            let stem = dir.join(m.stem);
            let installed = backend.model_files(&stem).exist();
            ModelStatus {
                name: m.name,
                stem,
                installed,
            }
        })
        .collect()
}
