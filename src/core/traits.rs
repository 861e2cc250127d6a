//! The classifier seam between the request pipeline and the model runtime.

use std::fmt::Debug;

use crate::core::errors::ServeError;
use crate::domain::{NormalizedTensor, ScoreVector};

/// A loaded model that scores a normalized 28x28 image over the ten digits.
///
/// Implementations are shared across concurrent requests, so `classify` takes
/// `&self` and must not change the model.
pub trait Classifier: Send + Sync + Debug {
    /// Scores one normalized image.
    ///
    /// # Arguments
    ///
    /// * `input` - Model input in the layout the classifier was built for
    ///
    /// # Returns
    ///
    /// One finite score per digit, or an inference error
    fn classify(&self, input: &NormalizedTensor) -> Result<ScoreVector, ServeError>;

    /// Short name of the model, used in logs and error messages.
    fn model_name(&self) -> &str;

    /// Get information about the inference engine.
    fn engine_info(&self) -> String;

    /// The model's declared input shape, with dynamic dimensions as non-positive values.
    fn input_shape(&self) -> Option<Vec<i64>> {
        None
    }
}
