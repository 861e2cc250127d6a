//! Pixel normalization for classifier input.
//!
//! Converts a resampled grayscale plane into a single-sample `f32` batch,
//! dividing intensities by 255 and laying them out in the order the model
//! expects.

use ndarray::ArrayView2;

use crate::core::Tensor4D;
use crate::core::constants::PIXEL_SCALE;
use crate::core::errors::ServeError;
use crate::domain::NormalizedTensor;
use crate::processors::types::InputLayout;

/// Normalizes grayscale planes into model input tensors.
///
/// The scale is fixed at 1/255: the model was trained on that range.
#[derive(Debug, Clone, Default)]
pub struct NormalizeImage {
    /// Tensor layout (NHWC or NCHW)
    pub layout: InputLayout,
}

impl NormalizeImage {
    /// Creates a normalizer with the given layout, NHWC when unset.
    pub fn new(layout: Option<InputLayout>) -> Self {
        Self {
            layout: layout.unwrap_or_default(),
        }
    }

    /// Normalizes a `[height, width]` plane of 0-255 intensities and returns
    /// it as a `[1, ...]` 4D tensor.
    pub fn normalize_to(&self, plane: ArrayView2<'_, f32>) -> Result<Tensor4D, ServeError> {
        let (height, width) = plane.dim();
        let shape = self.layout.batch_shape(1, height, width);

        // With one channel, NHWC and NCHW share the same row-major pixel order.
        let values: Vec<f32> = plane
            .iter()
            .map(|&v| (v * PIXEL_SCALE).clamp(0.0, 1.0))
            .collect();
        let len = values.len();

        Tensor4D::from_shape_vec(shape, values).map_err(|e| {
            ServeError::tensor_operation_error(
                match self.layout {
                    InputLayout::NHWC => "normalization_tensor_creation_nhwc",
                    InputLayout::NCHW => "normalization_tensor_creation_nchw",
                },
                &shape,
                &[len],
                e,
            )
        })
    }

    /// Normalizes a model-sized plane into a validated [`NormalizedTensor`].
    pub fn normalize(&self, plane: ArrayView2<'_, f32>) -> Result<NormalizedTensor, ServeError> {
        let tensor = self.normalize_to(plane)?;
        NormalizedTensor::new(tensor, self.layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::resize::pixel_plane;
    use crate::test_support::gradient;
    use image::{GrayImage, Luma};
    use ndarray::Array2;

    #[test]
    fn test_normalize_values_in_unit_range() {
        let plane = pixel_plane(&gradient(28, 28));
        let tensor = NormalizeImage::default().normalize(plane.view()).unwrap();
        assert_eq!(tensor.shape(), &[1, 28, 28, 1]);
        assert!(tensor.as_array().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_normalize_extremes() {
        let mut img = GrayImage::new(28, 28);
        img.put_pixel(27, 27, Luma([255]));
        let tensor = NormalizeImage::default()
            .normalize(pixel_plane(&img).view())
            .unwrap();
        assert_eq!(tensor.pixel(0, 0), 0.0);
        assert!((tensor.pixel(27, 27) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_divides_by_255() {
        let mut plane = Array2::<f32>::zeros((28, 28));
        plane[[1, 1]] = 127.5;
        plane[[2, 2]] = 51.0;
        let tensor = NormalizeImage::default().normalize(plane.view()).unwrap();
        assert!((tensor.pixel(1, 1) - 0.5).abs() < 1e-6);
        assert!((tensor.pixel(2, 2) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_nchw_layout() {
        let mut plane = Array2::<f32>::zeros((28, 28));
        plane[[2, 5]] = 51.0;
        let tensor = NormalizeImage::new(Some(InputLayout::NCHW))
            .normalize(plane.view())
            .unwrap();
        assert_eq!(tensor.shape(), &[1, 1, 28, 28]);
        assert!((tensor.as_array()[[0, 0, 2, 5]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_rejects_wrong_size() {
        let plane = Array2::<f32>::zeros((28, 27));
        let err = NormalizeImage::default().normalize(plane.view()).unwrap_err();
        assert!(matches!(err, ServeError::InvalidInput { .. }));
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let plane = pixel_plane(&gradient(28, 28));
        let normalizer = NormalizeImage::default();
        let a = normalizer.normalize(plane.view()).unwrap();
        let b = normalizer.normalize(plane.view()).unwrap();
        assert_eq!(a, b);
    }
}
