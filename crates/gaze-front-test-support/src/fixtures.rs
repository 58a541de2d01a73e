//! On-disk model fixtures for the candle backend.
//!
//! The fixtures are single linear layers with zero weights, so their output
//! equals the bias whatever the input. That makes end-to-end tests through
//! the real backend deterministic.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use safetensors::tensor::TensorView;

/// Writes `<dir>/<name>.json` and `<dir>/<name>.safetensors` and returns
/// the stem `<dir>/<name>`.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_model(
    dir: &Path,
    name: &str,
    descriptor: &serde_json::Value,
    tensors: &[(&str, Vec<usize>, Vec<f32>)],
) -> Result<PathBuf> {
    let stem = dir.join(name);

    let json = serde_json::to_string_pretty(descriptor)?;
    std::fs::write(stem.with_extension("json"), json).context("write descriptor")?;

    let views = tensors
        .iter()
        .map(|(tensor_name, shape, data)| {
            TensorView::new(
                safetensors::Dtype::F32,
                shape.clone(),
                bytemuck::cast_slice(data),
            )
            .map(|view| ((*tensor_name).to_string(), view))
            .with_context(|| format!("tensor view for '{tensor_name}'"))
        })
        .collect::<Result<HashMap<_, _>>>()?;
    let bytes = safetensors::serialize(&views, &None).context("serialize weights")?;
    std::fs::write(stem.with_extension("safetensors"), bytes).context("write weights")?;

    Ok(stem)
}

/// Writes a face detector that always emits `rows`.
///
/// The model declares input `[1, 3, height, width]` and output
/// `detection_out` shaped `(1, 1, rows.len(), 7)`.
///
/// # Errors
///
/// Returns an error if the files cannot be written.
pub fn write_constant_detector(
    dir: &Path,
    name: &str,
    input_size: (usize, usize),
    rows: &[[f32; 7]],
) -> Result<PathBuf> {
    let bias: Vec<f32> = rows.iter().flatten().copied().collect();
    write_constant_linear(
        dir,
        name,
        input_size,
        "detection_out",
        &bias,
        &[1, 1, rows.len(), 7],
    )
}

/// Writes a landmark model that always emits `values`.
///
/// The output is `(1, values.len(), 1, 1)`, the layout of landmark
/// regression models.
///
/// # Errors
///
/// Returns an error if the files cannot be written.
pub fn write_constant_landmarks(
    dir: &Path,
    name: &str,
    input_size: (usize, usize),
    values: &[f32],
) -> Result<PathBuf> {
    write_constant_linear(
        dir,
        name,
        input_size,
        "landmarks",
        values,
        &[1, values.len(), 1, 1],
    )
}

fn write_constant_linear(
    dir: &Path,
    name: &str,
    (height, width): (usize, usize),
    output_name: &str,
    bias: &[f32],
    output_shape: &[usize],
) -> Result<PathBuf> {
    let in_features = 3 * height * width;
    let out_features = bias.len();

    let descriptor = serde_json::json!({
        "name": name,
        "input": { "name": "data", "shape": [1, 3, height, width] },
        "output": { "name": output_name },
        "layers": [
            { "type": "flatten" },
            { "type": "linear", "name": "fc", "in_features": in_features, "out_features": out_features },
            { "type": "reshape", "shape": output_shape }
        ]
    });

    write_model(
        dir,
        name,
        &descriptor,
        &[
            (
                "fc.weight",
                vec![out_features, in_features],
                vec![0.0; out_features * in_features],
            ),
            ("fc.bias", vec![out_features], bias.to_vec()),
        ],
    )
}
