use image::{imageops::FilterType, ImageError};

/// Side length the classifier expects.
pub const INPUT_SIZE: u32 = 512;

/// Normalized RGB input, laid out as `[batch, height, width, channel]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    pub shape: [usize; 4],
    pub data: Vec<f32>,
}

pub fn preprocess(bytes: &[u8]) -> Result<ImageTensor, ImageError> {
    let rgb = image::load_from_memory(bytes)?.to_rgb8();
    let resized = image::imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);
    let data = resized
        .into_raw()
        .into_iter()
        .map(|channel| f32::from(channel) / 255.0)
        .collect();

    let side = INPUT_SIZE as usize;
    Ok(ImageTensor {
        shape: [1, side, side, 3],
        data,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    use super::*;

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_pixel(100, 100, Rgb([255, 0, 0]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), format)
            .expect("encode");
        bytes
    }

    #[test]
    fn resizes_to_model_input_and_normalizes() {
        let tensor = preprocess(&encoded(ImageFormat::Jpeg)).expect("preprocess");
        assert_eq!(tensor.shape, [1, 512, 512, 3]);
        assert_eq!(tensor.data.len(), 512 * 512 * 3);
        assert!(tensor.data.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn png_red_channel_stays_saturated() {
        let tensor = preprocess(&encoded(ImageFormat::Png)).expect("preprocess");
        assert_eq!(&tensor.data[..3], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn rejects_non_image_bytes() {
        assert!(preprocess(b"definitely not an image").is_err());
    }
}
