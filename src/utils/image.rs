//! Image helpers shared by the decoder and the client binary.

use image::{DynamicImage, GrayImage};

use crate::core::errors::ServeError;

/// Converts a DynamicImage to a single-channel 8-bit GrayImage.
///
/// Colour images are reduced with the `image` crate's luma weights. Any alpha
/// channel is dropped without compositing.
pub fn dynamic_to_gray(img: DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Reads an encoded image file without decoding it.
///
/// # Errors
///
/// Returns `ServeError::Io` if the file cannot be read, and a decode error
/// if it is empty.
pub fn read_image_bytes(path: &std::path::Path) -> Result<Vec<u8>, ServeError> {
    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Err(ServeError::decode_message(format!(
            "image file '{}' is empty",
            path.display()
        )));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_dynamic_to_gray_drops_color() {
        let mut rgb = RgbImage::new(2, 1);
        rgb.put_pixel(0, 0, Rgb([255, 255, 255]));
        let gray = dynamic_to_gray(DynamicImage::ImageRgb8(rgb));
        assert_eq!(gray.dimensions(), (2, 1));
        assert_eq!(gray.get_pixel(0, 0).0[0], 255);
        assert_eq!(gray.get_pixel(1, 0).0[0], 0);
    }

    #[test]
    fn test_read_image_bytes_rejects_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = read_image_bytes(file.path()).unwrap_err();
        assert!(matches!(err, ServeError::Decode { .. }));
    }

    #[test]
    fn test_read_image_bytes_missing_file() {
        let err = read_image_bytes(std::path::Path::new("no/such/image.png")).unwrap_err();
        assert!(matches!(err, ServeError::Io(_)));
    }
}
