use image::imageops::FilterType;
use tch::Tensor;

/// Side length of the square network input, in pixels.
pub const IMAGE_SIZE: u32 = 128;
/// RGB.
pub const CHANNELS: i64 = 3;

#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

/// Turns raw upload bytes into the network's input tensor.
///
/// Decodes the image, resizes it to exactly 128×128 with bilinear
/// resampling, converts to RGB (dropping alpha and palettes) and scales
/// pixel values from [0, 255] to [0.0, 1.0]. The output is an NHWC tensor
/// of shape `[1, 128, 128, 3]`.
///
/// Both the trainer and the server call this function, so the resampling
/// method seen at training time is the one seen at inference time.
pub fn image_to_tensor(bytes: &[u8]) -> Result<Tensor, PreprocessError> {
    let decoded = image::load_from_memory(bytes)?;
    let resized = decoded.resize_exact(IMAGE_SIZE, IMAGE_SIZE, FilterType::Triangle);
    let rgb = resized.to_rgb8();
    let pixels: Vec<f32> = rgb.into_raw().into_iter().map(|p| p as f32 / 255.0).collect();
    Ok(Tensor::from_slice(&pixels).view([1, IMAGE_SIZE as i64, IMAGE_SIZE as i64, CHANNELS]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn output_shape_is_fixed_regardless_of_input_resolution() {
        for (w, h) in [(128, 128), (17, 300), (640, 480)] {
            let tensor = image_to_tensor(&png_bytes(w, h, [10, 20, 30])).unwrap();
            assert_eq!(tensor.size(), vec![1, 128, 128, 3]);
        }
    }

    #[test]
    fn pixel_values_are_scaled_to_unit_range() {
        let tensor = image_to_tensor(&png_bytes(50, 40, [255, 127, 0])).unwrap();
        assert!(tensor.min().double_value(&[]) >= 0.0);
        assert!(tensor.max().double_value(&[]) <= 1.0);
        // Solid-color input survives resampling unchanged.
        assert!((tensor.double_value(&[0, 0, 0, 0]) - 1.0).abs() < 1e-6);
        assert!((tensor.double_value(&[0, 64, 64, 1]) - 127.0 / 255.0).abs() < 1e-6);
        assert!(tensor.double_value(&[0, 127, 127, 2]).abs() < 1e-6);
    }

    #[test]
    fn grayscale_input_is_expanded_to_three_channels() {
        let img = image::GrayImage::from_pixel(30, 30, image::Luma([200]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();

        let tensor = image_to_tensor(&buf.into_inner()).unwrap();
        assert_eq!(tensor.size(), vec![1, 128, 128, 3]);
    }

    #[test]
    fn corrupt_bytes_are_rejected() {
        assert!(image_to_tensor(b"definitely not an image").is_err());
    }
}
