//! Digit classification values passed between the pipeline stages.
//!
//! Each type checks its invariant on construction, so a value that exists is
//! a value the next stage can rely on: a [`NormalizedTensor`] always has the
//! model input shape with every element in [0, 1], a [`ScoreVector`] always
//! has one finite score per class, and a [`PredictedLabel`] is always a digit.

use thiserror::Error;

use crate::core::Tensor4D;
use crate::core::constants::{INPUT_HEIGHT, INPUT_WIDTH, NUM_CLASSES};
use crate::core::errors::ServeError;
use crate::processors::InputLayout;
use crate::processors::topk::Topk;

/// A single-sample model input, 28x28 with one channel and values in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor {
    data: Tensor4D,
    layout: InputLayout,
}

impl NormalizedTensor {
    /// Wraps `data`, checking its shape against `layout` and its value range.
    pub fn new(data: Tensor4D, layout: InputLayout) -> Result<Self, ServeError> {
        let expected = layout.batch_shape(1, INPUT_HEIGHT as usize, INPUT_WIDTH as usize);
        if data.shape() != expected {
            return Err(ServeError::invalid_input(format!(
                "normalized tensor must have shape {:?} for layout {}, got {:?}",
                expected,
                layout,
                data.shape()
            )));
        }

        if let Some(value) = data.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(ServeError::invalid_input(format!(
                "normalized tensor values must lie in [0, 1], found {}",
                value
            )));
        }

        Ok(Self { data, layout })
    }

    pub fn layout(&self) -> InputLayout {
        self.layout
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn as_array(&self) -> &Tensor4D {
        &self.data
    }

    /// Pixel value at row `y`, column `x`, independent of layout.
    pub fn pixel(&self, y: usize, x: usize) -> f32 {
        match self.layout {
            InputLayout::NHWC => self.data[[0, y, x, 0]],
            InputLayout::NCHW => self.data[[0, 0, y, x]],
        }
    }
}

/// Reasons a raw model output is not a usable score vector.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreVectorError {
    #[error("expected {expected} scores, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("score at index {index} is not finite: {value}")]
    NonFinite { index: usize, value: f32 },
}

/// One finite score per digit class, indexed by digit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVector {
    scores: Vec<f32>,
}

impl ScoreVector {
    pub fn new(scores: Vec<f32>) -> Result<Self, ScoreVectorError> {
        if scores.len() != NUM_CLASSES {
            return Err(ScoreVectorError::WrongLength {
                expected: NUM_CLASSES,
                actual: scores.len(),
            });
        }
        if let Some((index, &value)) = scores.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ScoreVectorError::NonFinite { index, value });
        }
        Ok(Self { scores })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.scores
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.scores
    }

    /// Index of the highest score. The first occurrence wins on ties.
    pub fn argmax(&self) -> PredictedLabel {
        let mut best = 0;
        for (idx, &score) in self.scores.iter().enumerate().skip(1) {
            if score > self.scores[best] {
                best = idx;
            }
        }
        // NUM_CLASSES is 10, so every index is a digit.
        PredictedLabel(best as u8)
    }

    pub fn score(&self, label: PredictedLabel) -> f32 {
        self.scores[label.index()]
    }
}

/// A digit in [0, 9].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PredictedLabel(u8);

impl PredictedLabel {
    pub fn new(digit: u8) -> Option<Self> {
        (usize::from(digit) < NUM_CLASSES).then_some(Self(digit))
    }

    pub fn digit(self) -> u8 {
        self.0
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl std::fmt::Display for PredictedLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The outcome of classifying one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// The predicted digit.
    pub label: PredictedLabel,
    /// Score of the predicted digit.
    pub confidence: f32,
    /// Scores for all classes.
    pub scores: ScoreVector,
}

impl Prediction {
    pub fn from_scores(scores: ScoreVector) -> Self {
        let label = scores.argmax();
        Self {
            label,
            confidence: scores.score(label),
            scores,
        }
    }

    /// The `k` best digits with their scores, best first.
    pub fn top_k(&self, k: usize) -> Vec<(PredictedLabel, f32)> {
        let Ok(result) = Topk::new().process_single(self.scores.as_slice(), k) else {
            return Vec::new();
        };

        result
            .indexes
            .into_iter()
            .zip(result.scores)
            .flat_map(|(indexes, scores)| indexes.into_iter().zip(scores))
            .filter_map(|(idx, score)| {
                u8::try_from(idx)
                    .ok()
                    .and_then(PredictedLabel::new)
                    .map(|label| (label, score))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: [f32; 10]) -> ScoreVector {
        ScoreVector::new(values.to_vec()).unwrap()
    }

    #[test]
    fn test_argmax_picks_lowest_index_on_tie() {
        let v = scores([0.1, 0.9, 0.9, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(v.argmax().digit(), 1);
    }

    #[test]
    fn test_argmax_all_equal_is_zero() {
        let v = scores([0.1; 10]);
        assert_eq!(v.argmax().digit(), 0);
    }

    #[test]
    fn test_argmax_last_index() {
        let v = scores([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.1, 0.2]);
        assert_eq!(v.argmax().digit(), 9);
    }

    #[test]
    fn test_argmax_negative_logits() {
        let v = scores([-3.0, -1.5, -2.0, -9.0, -4.0, -1.0, -7.0, -8.0, -2.5, -3.5]);
        assert_eq!(v.argmax().digit(), 5);
    }

    #[test]
    fn test_score_vector_rejects_wrong_length() {
        let err = ScoreVector::new(vec![0.5; 3]).unwrap_err();
        assert_eq!(
            err,
            ScoreVectorError::WrongLength {
                expected: 10,
                actual: 3
            }
        );
    }

    #[test]
    fn test_score_vector_rejects_nan() {
        let mut values = vec![0.0; 10];
        values[4] = f32::NAN;
        let err = ScoreVector::new(values).unwrap_err();
        assert!(matches!(err, ScoreVectorError::NonFinite { index: 4, .. }));
    }

    #[test]
    fn test_predicted_label_range() {
        assert!(PredictedLabel::new(0).is_some());
        assert!(PredictedLabel::new(9).is_some());
        assert!(PredictedLabel::new(10).is_none());
    }

    #[test]
    fn test_prediction_from_scores() {
        let prediction =
            Prediction::from_scores(scores([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.8, 0.2, 0.0]));
        assert_eq!(prediction.label.digit(), 7);
        assert!((prediction.confidence - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_prediction_top_k() {
        let prediction =
            Prediction::from_scores(scores([0.05, 0.0, 0.0, 0.6, 0.0, 0.0, 0.0, 0.3, 0.05, 0.0]));
        let top = prediction.top_k(3);
        let digits: Vec<u8> = top.iter().map(|(label, _)| label.digit()).collect();
        assert_eq!(digits, vec![3, 7, 0]);
    }

    #[test]
    fn test_normalized_tensor_checks_shape() {
        let data = Tensor4D::zeros((1, 28, 28, 1));
        assert!(NormalizedTensor::new(data.clone(), InputLayout::NHWC).is_ok());
        assert!(NormalizedTensor::new(data, InputLayout::NCHW).is_err());
    }

    #[test]
    fn test_normalized_tensor_checks_range() {
        let mut data = Tensor4D::zeros((1, 1, 28, 28));
        data[[0, 0, 3, 3]] = 1.5;
        let err = NormalizedTensor::new(data, InputLayout::NCHW).unwrap_err();
        assert!(matches!(err, ServeError::InvalidInput { .. }));
    }

    #[test]
    fn test_normalized_tensor_pixel_is_layout_independent() {
        let mut nhwc = Tensor4D::zeros((1, 28, 28, 1));
        nhwc[[0, 2, 5, 0]] = 0.5;
        let mut nchw = Tensor4D::zeros((1, 1, 28, 28));
        nchw[[0, 0, 2, 5]] = 0.5;

        let a = NormalizedTensor::new(nhwc, InputLayout::NHWC).unwrap();
        let b = NormalizedTensor::new(nchw, InputLayout::NCHW).unwrap();
        assert_eq!(a.pixel(2, 5), 0.5);
        assert_eq!(b.pixel(2, 5), 0.5);
    }
}
