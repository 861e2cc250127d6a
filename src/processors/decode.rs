//! Decoding of raw request bytes into a grayscale pixel grid.

use std::io::Cursor;

use image::{GrayImage, ImageReader, Limits};

use crate::core::constants::{DEFAULT_MAX_IMAGE_BYTES, DEFAULT_MAX_IMAGE_DIMENSION};
use crate::core::errors::ServeError;
use crate::utils::dynamic_to_gray;

/// Decodes encoded images of any format the `image` crate supports.
///
/// Inputs are bounded twice: by encoded size before any parsing happens, and
/// by declared pixel dimensions before the decoder allocates a buffer.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    max_image_bytes: usize,
    max_image_dimension: u32,
}

impl ImageDecoder {
    pub fn new(max_image_bytes: usize, max_image_dimension: u32) -> Self {
        Self {
            max_image_bytes,
            max_image_dimension,
        }
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    pub fn max_image_dimension(&self) -> u32 {
        self.max_image_dimension
    }

    /// Checks the encoded size against the configured limit.
    pub fn check_payload(&self, bytes: &[u8]) -> Result<(), ServeError> {
        if bytes.is_empty() {
            return Err(ServeError::decode_message("empty image buffer"));
        }
        if bytes.len() > self.max_image_bytes {
            return Err(ServeError::PayloadTooLarge {
                limit: self.max_image_bytes,
                actual: bytes.len(),
            });
        }
        Ok(())
    }

    /// Decodes `bytes` into a single-channel image.
    ///
    /// # Errors
    ///
    /// * `ServeError::PayloadTooLarge` if the buffer exceeds the byte limit.
    /// * `ServeError::Decode` if the buffer is empty, the format is not
    ///   recognised, the data is truncated or corrupt, or the declared
    ///   dimensions exceed the limit.
    pub fn decode(&self, bytes: &[u8]) -> Result<GrayImage, ServeError> {
        self.check_payload(bytes)?;

        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ServeError::decode_error("failed to read image header", e))?;

        if reader.format().is_none() {
            return Err(ServeError::decode_message("unrecognized image format"));
        }

        let mut limits = Limits::default();
        limits.max_image_width = Some(self.max_image_dimension);
        limits.max_image_height = Some(self.max_image_dimension);
        reader.limits(limits);

        let image = reader.decode()?;
        Ok(dynamic_to_gray(image))
    }
}

impl Default for ImageDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IMAGE_BYTES, DEFAULT_MAX_IMAGE_DIMENSION)
    }
}
