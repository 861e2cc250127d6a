//! Domain-level values for digit classification.

pub mod digit;

pub use digit::{NormalizedTensor, PredictedLabel, Prediction, ScoreVector, ScoreVectorError};
