//! Device selection for inference.

use anyhow::{bail, Context, Result};
use candle_core::Device;
use tracing::info;

/// Returns the best available device for inference.
///
/// Uses GPU (Metal on macOS, CUDA on Linux/Windows) when the crate was built
/// with the matching feature and a device is present, falling back to CPU.
#[must_use]
pub fn get_device() -> Device {
    #[cfg(feature = "metal")]
    {
        if let Ok(device) = Device::new_metal(0) {
            info!("Using Metal device for inference");
            return device;
        }
    }

    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            info!("Using CUDA device for inference");
            return device;
        }
    }

    info!("Using CPU for inference");
    Device::Cpu
}

/// Resolves a device string such as `"CPU"`, `"GPU"`, `"GPU.1"`, `"CUDA:0"`,
/// `"METAL"` or `"AUTO"`.
///
/// Matching is case-insensitive. The ordinal suffix (after `.` or `:`)
/// defaults to 0.
///
/// # Errors
///
/// Returns an error for unknown device names, malformed ordinals, or a GPU
/// that is not available in this build.
pub fn parse_device(spec: &str) -> Result<Device> {
    let spec = spec.trim();
    let (name, ordinal) = match spec.split_once(['.', ':']) {
        Some((name, ordinal)) => {
            let ordinal: usize = ordinal
                .parse()
                .with_context(|| format!("Invalid device ordinal in '{spec}'"))?;
            (name, ordinal)
        }
        None => (spec, 0),
    };

    match name.to_ascii_uppercase().as_str() {
        "CPU" => {
            if ordinal != 0 {
                bail!("CPU device does not take an ordinal: '{spec}'");
            }
            Ok(Device::Cpu)
        }
        "GPU" | "CUDA" => {
            let device = Device::new_cuda(ordinal)
                .with_context(|| format!("CUDA device {ordinal} unavailable"))?;
            info!("Using CUDA device {ordinal} for inference");
            Ok(device)
        }
        "METAL" => {
            let device = Device::new_metal(ordinal)
                .with_context(|| format!("Metal device {ordinal} unavailable"))?;
            info!("Using Metal device {ordinal} for inference");
            Ok(device)
        }
        "AUTO" => Ok(get_device()),
        "" => bail!("Empty device name"),
        other => bail!("Unknown device '{other}'"),
    }
}
