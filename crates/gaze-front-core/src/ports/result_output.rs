//! Result output port for writing per-frame results.

use crate::domain::FrameResult;

/// Port for outputting front-end results.
pub trait ResultOutput: Send + Sync {
    /// Writes a single frame result.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, result: &FrameResult) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
