//! Weight loading from safetensors blobs.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use safetensors::SafeTensors;
use tracing::debug;

/// Loads a safetensors file and creates a `VarBuilder` over its tensors.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The safetensors data is invalid or uses an unsupported dtype
pub fn load_safetensors(path: impl AsRef<Path>, device: &Device) -> Result<VarBuilder<'static>> {
    let path = path.as_ref();
    debug!("Loading safetensors from {}", path.display());

    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read weights file: {}", path.display()))?;

    let tensors = SafeTensors::deserialize(&data)
        .with_context(|| format!("Failed to parse safetensors: {}", path.display()))?;

    let mut tensor_map: HashMap<String, Tensor> = HashMap::new();

    for name in tensors.names() {
        let tensor_view = tensors
            .tensor(name)
            .with_context(|| format!("Failed to get tensor '{name}'"))?;

        let dtype = safetensors_dtype_to_candle(tensor_view.dtype())?;
        let shape: Vec<usize> = tensor_view.shape().to_vec();

        let tensor = Tensor::from_raw_buffer(tensor_view.data(), dtype, &shape, device)
            .with_context(|| format!("Failed to create tensor '{name}'"))?;

        tensor_map.insert(name.clone(), tensor);
    }

    debug!("Loaded {} tensors", tensor_map.len());
    Ok(VarBuilder::from_tensors(tensor_map, DType::F32, device))
}

/// Converts safetensors dtype to candle dtype.
fn safetensors_dtype_to_candle(dtype: safetensors::Dtype) -> Result<DType> {
    use safetensors::Dtype as S;
    match dtype {
        S::F32 => Ok(DType::F32),
        S::F64 => Ok(DType::F64),
        S::F16 => Ok(DType::F16),
        S::BF16 => Ok(DType::BF16),
        S::I64 => Ok(DType::I64),
        S::U8 => Ok(DType::U8),
        S::U32 => Ok(DType::U32),
        other => anyhow::bail!("Unsupported dtype: {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[allow(clippy::expect_used)]
    fn write_safetensors(tensors: &[(&str, Vec<usize>, Vec<f32>)]) -> NamedTempFile {
        use safetensors::serialize;
        use safetensors::tensor::TensorView;

        let views: HashMap<String, TensorView<'_>> = tensors
            .iter()
            .map(|(name, shape, data)| {
                let view = TensorView::new(
                    safetensors::Dtype::F32,
                    shape.clone(),
                    bytemuck::cast_slice(data),
                )
                .expect("valid tensor view");
                ((*name).to_string(), view)
            })
            .collect();
        let serialized = serialize(&views, &None).expect("serialize");

        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(&serialized).expect("write");
        file
    }

    #[test]
    fn test_load_safetensors() {
        let file = write_safetensors(&[("fc.weight", vec![2, 2], vec![1.0, 2.0, 3.0, 4.0])]);
        let vb = load_safetensors(file.path(), &Device::Cpu);
        assert!(vb.is_ok_and(|vb| vb.contains_tensor("fc.weight")));
    }

    #[test]
    fn test_load_safetensors_missing_file() {
        let result = load_safetensors("/nonexistent/path.safetensors", &Device::Cpu);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_safetensors_garbage() {
        let mut file = NamedTempFile::new().unwrap_or_else(|e| panic!("temp file: {e}"));
        file.write_all(b"not a safetensors blob")
            .unwrap_or_else(|e| panic!("write: {e}"));
        let result = load_safetensors(file.path(), &Device::Cpu);
        assert!(result.is_err());
    }
}
