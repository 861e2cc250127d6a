use super::*;
use crate::core::errors::SimpleError;
use crate::core::traits::Classifier;
use crate::domain::{NormalizedTensor, ScoreVector};
use ndarray::ArrayView2;
use ort::value::TensorRef;

impl OrtInfer {
    /// Returns the name of the model's first declared output.
    fn get_output_name(&self) -> Result<String, ServeError> {
        let session = self.sessions[0].lock().map_err(|_| {
            ServeError::inference_error(
                &self.model_name,
                "failed to acquire session lock",
                SimpleError::new("session mutex poisoned"),
            )
        })?;
        session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| {
                ServeError::malformed_output(
                    &self.model_name,
                    "no outputs available in session, model may be invalid",
                )
            })
    }

    fn run_inference_with_processor<T>(
        &self,
        x: &Tensor4D,
        processor: impl FnOnce(&[i64], &[f32]) -> Result<T, ServeError>,
    ) -> Result<T, ServeError> {
        let input_shape = x.shape().to_vec();
        let output_name = self.get_output_name()?;

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            ServeError::model_inference_error(
                &self.model_name,
                "tensor_conversion",
                &input_shape,
                "failed to convert input tensor",
                e,
            )
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let idx = self
            .next_idx
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            % self.sessions.len();
        let mut session_guard = self.sessions[idx].lock().map_err(|_| {
            ServeError::inference_error(
                &self.model_name,
                &format!(
                    "failed to acquire session lock for session {}/{}",
                    idx,
                    self.sessions.len()
                ),
                SimpleError::new("session mutex poisoned"),
            )
        })?;

        let outputs = session_guard.run(inputs).map_err(|e| {
            ServeError::model_inference_error(
                &self.model_name,
                "forward_pass",
                &input_shape,
                &format!(
                    "ONNX Runtime inference failed with input '{}' -> output '{}'",
                    self.input_name, output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                ServeError::model_inference_error(
                    &self.model_name,
                    "output_extraction",
                    &input_shape,
                    &format!("failed to extract output tensor '{}' as f32", output_name),
                    e,
                )
            })?;

        processor(output_shape, output_data)
    }

    /// Runs the model and returns its output as `[batch, classes]`.
    pub fn infer_2d(&self, x: &Tensor4D) -> Result<Tensor2D, ServeError> {
        let batch_size = x.shape()[0];
        self.run_inference_with_processor(x, |output_shape, output_data| {
            scores_from_output(&self.model_name, output_shape, output_data, batch_size)
        })
    }
}

/// Reshapes a raw output tensor into `[batch, classes]`.
///
/// Rank-1 outputs are treated as a single row. Any other rank, a row count
/// other than `batch`, or a data length that disagrees with the shape is a
/// malformed output.
pub(super) fn scores_from_output(
    model_name: &str,
    shape: &[i64],
    data: &[f32],
    batch: usize,
) -> Result<Tensor2D, ServeError> {
    let (rows, num_classes) = match *shape {
        [n] if n > 0 => (1, n as usize),
        [b, n] if b > 0 && n > 0 => (b as usize, n as usize),
        _ => {
            return Err(ServeError::malformed_output(
                model_name,
                format!("expected a [batch, classes] output, got shape {:?}", shape),
            ));
        }
    };

    if rows != batch || data.len() != rows * num_classes {
        return Err(ServeError::malformed_output(
            model_name,
            format!(
                "output shape {:?} with {} values does not match batch of {}",
                shape,
                data.len(),
                batch
            ),
        ));
    }

    let array_view = ArrayView2::from_shape((rows, num_classes), data)?;
    Ok(array_view.to_owned())
}

impl Classifier for OrtInfer {
    fn classify(&self, input: &NormalizedTensor) -> Result<ScoreVector, ServeError> {
        let output = self.infer_2d(input.as_array())?;
        let scores = output.row(0).to_vec();
        ScoreVector::new(scores).map_err(|e| {
            ServeError::inference_error(&self.model_name, "model output is not a score vector", e)
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn engine_info(&self) -> String {
        format!(
            "onnxruntime: model '{}' at {}, {} session(s), input '{}'",
            self.model_name,
            self.model_path.display(),
            self.sessions.len(),
            self.input_name
        )
    }

    fn input_shape(&self) -> Option<Vec<i64>> {
        self.primary_input_shape()
    }
}
