//! Filesystem adapter for loading frames.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gaze_front_core::{ImageInfo, ImageSource};
use tracing::{debug, warn};

/// Supported image extensions.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif", "webp", "bmp", "gif"];

/// Filesystem image source adapter.
pub struct FsImageSource {
    paths: Vec<PathBuf>,
    recursive: bool,
}

impl FsImageSource {
    /// Creates a new filesystem image source.
    ///
    /// # Arguments
    ///
    /// * `paths` - Files or directories to scan
    /// * `recursive` - Whether to recurse into subdirectories
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        Self { paths, recursive }
    }

    /// Collects all image files from the configured paths.
    ///
    /// Files named explicitly keep their order; directory entries are
    /// sorted so repeated runs visit frames in the same order.
    fn collect_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for path in &self.paths {
            if path.is_file() {
                if is_supported_image(path) {
                    files.push(path.clone());
                } else {
                    warn!("Unsupported file type: {}", path.display());
                }
            } else if path.is_dir() {
                self.collect_from_dir(path, &mut files);
            } else {
                warn!("Path does not exist: {}", path.display());
            }
        }

        files
    }

    fn collect_from_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to read directory {}: {e}", dir.display());
                return;
            }
        };

        let mut paths: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
        paths.sort();

        for path in paths {
            if path.is_file() && is_supported_image(&path) {
                files.push(path);
            } else if path.is_dir() && self.recursive {
                self.collect_from_dir(&path, files);
            }
        }
    }
}

impl ImageSource for FsImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = Result<ImageInfo>> + Send + '_> {
        let files = self.collect_files();
        debug!("Found {} image files", files.len());

        Box::new(files.into_iter().map(|path| load_image(&path)))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.collect_files().len())
    }
}

/// Checks if a path has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

/// Loads and decodes a frame from the filesystem.
fn load_image(path: &Path) -> Result<ImageInfo> {
    let image =
        image::open(path).with_context(|| format!("Failed to open image: {}", path.display()))?;
    Ok(ImageInfo::new(path.to_string_lossy(), image))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(Path::new("frame.jpg")));
        assert!(is_supported_image(Path::new("frame.JPEG")));
        assert!(is_supported_image(Path::new("frame.png")));
        assert!(is_supported_image(Path::new("frame.bmp")));
        assert!(!is_supported_image(Path::new("frame.cr2")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("frame")));
    }

    #[test]
    fn test_missing_path_yields_nothing() {
        let source = FsImageSource::new(vec![PathBuf::from("/nonexistent/frame.png")], false);
        assert_eq!(source.count_hint(), Some(0));
    }
}
