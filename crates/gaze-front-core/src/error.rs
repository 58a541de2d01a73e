//! Error taxonomy for the inference stages.

use thiserror::Error;

/// Errors raised by the face and landmark stages.
///
/// Every error is raised synchronously by the call that detects it. Nothing
/// is retried internally.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid threshold, device or other stage parameter.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The backend could not load the model onto the requested device.
    #[error("failed to load model {model}: {source:#}")]
    Load {
        /// Model stem that was being loaded.
        model: String,
        /// Underlying backend failure.
        #[source]
        source: anyhow::Error,
    },

    /// `predict` was called before a successful `load`.
    #[error("model not loaded; call load() before predict()")]
    NotLoaded,

    /// Image or tensor incompatible with the model's declared shapes.
    #[error("shape mismatch: {0}")]
    Shape(String),

    /// The backend failed while running inference.
    #[error("inference failed: {0:#}")]
    Inference(#[source] anyhow::Error),

    /// A placeholder hook with no implementation was invoked.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

/// Result alias for stage operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn load(model: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Load {
            model: model.into(),
            source,
        }
    }
}
