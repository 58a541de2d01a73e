//! Builders for raw model output tensors.

use candle_core::{Device, Tensor};

/// Builds a `(1, 1, N, 7)` detection-output tensor from rows of
/// `[image_id, label, confidence, xmin, ymin, xmax, ymax]`.
///
/// # Panics
///
/// Panics if the tensor cannot be created.
#[must_use]
#[allow(clippy::expect_used)]
pub fn detection_output(rows: &[[f32; 7]]) -> Tensor {
    let flat: Vec<f32> = rows.iter().flatten().copied().collect();
    Tensor::from_vec(flat, (1, 1, rows.len(), 7), &Device::Cpu).expect("detection tensor")
}

/// Builds a detection row for image 0, label 1.
#[must_use]
pub const fn face_row(confidence: f32, corners: [f32; 4]) -> [f32; 7] {
    [
        0.0, 1.0, confidence, corners[0], corners[1], corners[2], corners[3],
    ]
}

/// Builds a `(1, N, 1, 1)` landmark regression tensor.
///
/// # Panics
///
/// Panics if the tensor cannot be created.
#[must_use]
#[allow(clippy::expect_used)]
pub fn landmark_output(values: &[f32]) -> Tensor {
    Tensor::from_vec(values.to_vec(), (1, values.len(), 1, 1), &Device::Cpu)
        .expect("landmark tensor")
}
