//! Fixtures shared by the unit tests.

use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma};

use crate::core::errors::{ServeError, SimpleError};
use crate::core::traits::Classifier;
use crate::domain::{NormalizedTensor, ScoreVector};

/// Encodes `img` in the given container format.
pub fn encode(img: &GrayImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format)
        .expect("in-memory encode");
    bytes
}

/// A diagonal gradient, black at the top-left corner.
pub fn gradient(width: u32, height: u32) -> GrayImage {
    let span = (width + height).saturating_sub(2).max(1);
    GrayImage::from_fn(width, height, |x, y| {
        Luma([((x + y) * 255 / span).min(255) as u8])
    })
}

/// A hand-drawn "7": white strokes on black, MNIST style.
pub fn seven_bitmap() -> GrayImage {
    let mut img = GrayImage::new(28, 28);
    for y in 5..8 {
        for x in 6..22 {
            img.put_pixel(x, y, Luma([255]));
        }
    }
    // Diagonal stroke from the right end of the bar down to the lower left.
    for step in 0..16u32 {
        let y = 8 + step;
        let x = 21 - step * 2 / 3;
        for dx in 0..3 {
            img.put_pixel(x - dx, y, Luma([255]));
        }
    }
    img
}

/// Returns the same scores for every input.
#[derive(Debug)]
pub struct FixedScores {
    pub scores: Vec<f32>,
    pub shape: Option<Vec<i64>>,
}

impl FixedScores {
    pub fn new(scores: Vec<f32>) -> Self {
        Self {
            scores,
            shape: None,
        }
    }

    pub fn with_shape(mut self, shape: Vec<i64>) -> Self {
        self.shape = Some(shape);
        self
    }
}

impl Classifier for FixedScores {
    fn classify(&self, _input: &NormalizedTensor) -> Result<ScoreVector, ServeError> {
        ScoreVector::new(self.scores.clone())
            .map_err(|e| ServeError::inference_error("fixed", "bad scores", e))
    }

    fn model_name(&self) -> &str {
        "fixed"
    }

    fn engine_info(&self) -> String {
        "fixed scores".to_string()
    }

    fn input_shape(&self) -> Option<Vec<i64>> {
        self.shape.clone()
    }
}

/// Predicts the digit nearest to `9 * mean intensity`, so black images give
/// 0 and white images give 9.
#[derive(Debug, Default)]
pub struct MeanIntensity;

impl Classifier for MeanIntensity {
    fn classify(&self, input: &NormalizedTensor) -> Result<ScoreVector, ServeError> {
        let mean = input.as_array().mean().unwrap_or(0.0);
        let target = mean * 9.0;
        let scores = (0..10).map(|i| -(target - i as f32).abs()).collect();
        ScoreVector::new(scores)
            .map_err(|e| ServeError::inference_error("mean-intensity", "bad scores", e))
    }

    fn model_name(&self) -> &str {
        "mean-intensity"
    }

    fn engine_info(&self) -> String {
        "mean intensity".to_string()
    }
}

/// Fails every call, like a model that raises at runtime.
#[derive(Debug, Default)]
pub struct Failing;

impl Classifier for Failing {
    fn classify(&self, _input: &NormalizedTensor) -> Result<ScoreVector, ServeError> {
        Err(ServeError::inference_error(
            "failing",
            "forward pass raised",
            SimpleError::new("boom"),
        ))
    }

    fn model_name(&self) -> &str {
        "failing"
    }

    fn engine_info(&self) -> String {
        "always fails".to_string()
    }
}
