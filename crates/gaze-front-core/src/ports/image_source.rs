//! Image source port for feeding frames into the front-end.

use crate::domain::ImageInfo;

/// Port for loading frames from a source.
pub trait ImageSource: Send + Sync {
    /// Returns an iterator over frames from this source.
    ///
    /// # Errors
    ///
    /// Individual items may be errors if a frame fails to load.
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<ImageInfo>> + Send + '_>;

    /// Returns the total number of frames, if known.
    fn count_hint(&self) -> Option<usize>;
}
