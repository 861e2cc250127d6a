//! Classification models.

pub mod digit_classifier;

pub use digit_classifier::{DigitClassifier, DigitClassifierBuilder, PreprocessConfig};
