//! Image to tensor conversion and output tensor reading.

#![allow(clippy::cast_possible_truncation)]

use candle_core::{DType, Device, Tensor};
use image::{imageops::FilterType, DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Channel order the model expects in its input planes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    /// Blue, green, red. The layout of OpenCV frames.
    #[default]
    Bgr,
    /// Red, green, blue.
    Rgb,
}

/// Converts an image into a `(1, 3, H, W)` f32 tensor for a model whose
/// declared input shape is `input_shape`.
///
/// The image is resized to the declared spatial size with bilinear
/// filtering, its channels are split into planes (HWC to CHW) in the
/// requested order, and a batch dimension of one is prepended. Samples keep
/// their raw `0..=255` range.
///
/// # Errors
///
/// Returns [`Error::Shape`] if the image has fewer than three channels or no
/// pixels, or if `input_shape` is not `[1, 3, H, W]` with non-zero `H`, `W`.
pub fn image_to_tensor(
    image: &DynamicImage,
    input_shape: &[usize],
    order: ChannelOrder,
) -> Result<Tensor> {
    let channels = image.color().channel_count();
    if channels < 3 {
        return Err(Error::Shape(format!(
            "image has {channels} channel(s), at least 3 are required"
        )));
    }

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::Shape(format!("image is empty ({width}x{height})")));
    }

    let (target_h, target_w) = match *input_shape {
        [1, 3, h, w] if h > 0 && w > 0 => (h, w),
        _ => {
            return Err(Error::Shape(format!(
                "model input shape {input_shape:?} is not [1, 3, H, W]"
            )))
        }
    };
    let (Ok(target_w32), Ok(target_h32)) = (u32::try_from(target_w), u32::try_from(target_h))
    else {
        return Err(Error::Shape(format!(
            "model input size {target_w}x{target_h} is too large"
        )));
    };

    let resized = image.resize_exact(target_w32, target_h32, FilterType::Triangle);
    let rgb = resized.to_rgb8();

    let plane = target_h * target_w;
    let mut data = vec![0.0f32; 3 * plane];
    let channel_index = match order {
        ChannelOrder::Bgr => [2, 1, 0],
        ChannelOrder::Rgb => [0, 1, 2],
    };
    for (i, pixel) in rgb.pixels().enumerate() {
        for (plane_index, &source) in channel_index.iter().enumerate() {
            data[plane_index * plane + i] = f32::from(pixel[source]);
        }
    }

    Tensor::from_vec(data, (1, 3, target_h, target_w), &Device::Cpu)
        .map_err(|e| Error::Shape(format!("failed to build input tensor: {e}")))
}

/// Flattens an output tensor into f32 values on the CPU.
///
/// # Errors
///
/// Returns [`Error::Shape`] if the tensor cannot be converted.
pub fn tensor_values(tensor: &Tensor) -> Result<Vec<f32>> {
    tensor
        .to_dtype(DType::F32)
        .and_then(|t| t.flatten_all())
        .and_then(|t| t.to_vec1::<f32>())
        .map_err(|e| Error::Shape(format!("unreadable output tensor: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, RgbaImage};

    fn solid_rgb(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    #[test]
    fn test_output_shape_matches_model() {
        let img = solid_rgb(64, 48, [10, 20, 30]);
        let tensor = image_to_tensor(&img, &[1, 3, 16, 24], ChannelOrder::Rgb).unwrap();
        assert_eq!(tensor.dims(), &[1, 3, 16, 24]);
    }

    #[test]
    fn test_rgb_planes() {
        let img = solid_rgb(4, 4, [10, 20, 30]);
        let tensor = image_to_tensor(&img, &[1, 3, 2, 2], ChannelOrder::Rgb).unwrap();
        let values = tensor_values(&tensor).unwrap();
        assert_eq!(&values[0..4], &[10.0; 4]);
        assert_eq!(&values[4..8], &[20.0; 4]);
        assert_eq!(&values[8..12], &[30.0; 4]);
    }

    #[test]
    fn test_bgr_planes() {
        let img = solid_rgb(4, 4, [10, 20, 30]);
        let tensor = image_to_tensor(&img, &[1, 3, 2, 2], ChannelOrder::Bgr).unwrap();
        let values = tensor_values(&tensor).unwrap();
        assert_eq!(values[0], 30.0);
        assert_eq!(values[4], 20.0);
        assert_eq!(values[8], 10.0);
    }

    #[test]
    fn test_spatial_layout_is_row_major() {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 0, Rgb([255, 0, 0]));
        let img = DynamicImage::ImageRgb8(img);
        let tensor = image_to_tensor(&img, &[1, 3, 2, 2], ChannelOrder::Rgb).unwrap();
        let values = tensor_values(&tensor).unwrap();
        // Red plane: (x=1, y=0) is the second element.
        assert_eq!(&values[0..4], &[0.0, 255.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rgba_accepted() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(8, 8));
        assert!(image_to_tensor(&img, &[1, 3, 4, 4], ChannelOrder::Bgr).is_ok());
    }

    #[test]
    fn test_single_channel_rejected() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([128])));
        let err = image_to_tensor(&img, &[1, 3, 4, 4], ChannelOrder::Bgr).unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
    }

    #[test]
    fn test_empty_image_rejected() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        let err = image_to_tensor(&img, &[1, 3, 4, 4], ChannelOrder::Bgr).unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
    }

    #[test]
    fn test_bad_model_shape_rejected() {
        let img = solid_rgb(8, 8, [0, 0, 0]);
        for shape in [&[1, 3, 4][..], &[2, 3, 4, 4], &[1, 1, 4, 4], &[1, 3, 0, 4]] {
            let err = image_to_tensor(&img, shape, ChannelOrder::Bgr).unwrap_err();
            assert!(matches!(err, Error::Shape(_)), "shape {shape:?}");
        }
    }
}
