//! Test support utilities for gaze-front.
//!
//! Provides a scripted inference backend, synthetic frames, raw output
//! tensors and on-disk model fixtures for testing the front-end stages.
//!
//! # Example
//!
//! ```
//! use gaze_front_test_support::{detection_output, face_row, MockBackend, SyntheticImageBuilder};
//!
//! let frame = SyntheticImageBuilder::rgb_uniform(640, 480, 90, 120, 150);
//! let backend = MockBackend::new(
//!     &[1, 3, 300, 300],
//!     detection_output(&[face_row(0.9, [0.1, 0.2, 0.3, 0.4])]),
//! );
//! # let _ = (frame, backend);
//! ```

mod builders;
pub mod fixtures;
mod mocks;
mod tensors;

pub use builders::SyntheticImageBuilder;
pub use mocks::{LoadCall, MockBackend, MockImageSource, MockModel, MockResultOutput};
pub use tensors::{detection_output, face_row, landmark_output};
