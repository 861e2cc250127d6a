//! Constructor helpers for [`ServeError`].
//!
//! These keep call sites short and make sure every error carries enough
//! context to be useful in a log line or a gRPC status message.

use super::types::{ProcessingStage, ServeError, SimpleError};

impl ServeError {
    /// Creates a decode error wrapping the underlying cause.
    pub fn decode_error(
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Decode {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a decode error from a message alone.
    pub fn decode_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Decode {
            context: message.clone(),
            source: Box::new(SimpleError::new(message)),
        }
    }

    /// Creates an error for a preprocessing stage.
    pub fn processing_error(
        stage: ProcessingStage,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            stage,
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an error for tensor construction during normalization, with shape details.
    pub fn tensor_operation_error(
        operation: &str,
        expected_shape: &[usize],
        actual_shape: &[usize],
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_error(
            ProcessingStage::Normalization,
            format!(
                "operation '{}' expected shape {:?}, got {:?}",
                operation, expected_shape, actual_shape
            ),
            error,
        )
    }

    /// Creates an inference error with model context.
    pub fn inference_error(
        model_name: &str,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.to_string(),
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an inference error describing a specific runtime operation and input shape.
    pub fn model_inference_error(
        model_name: &str,
        operation: &str,
        input_shape: &[usize],
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.to_string(),
            context: format!(
                "operation '{}' on input {:?}: {}",
                operation, input_shape, context
            ),
            source: Box::new(error),
        }
    }

    /// Creates an inference error for output that does not have the expected form.
    pub fn malformed_output(model_name: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Inference {
            model_name: model_name.to_string(),
            context: message.clone(),
            source: Box::new(SimpleError::new(message)),
        }
    }

    /// Creates a ServeError for model load failures with contextual suggestions.
    ///
    /// # Arguments
    /// * `model_path` - Path to the model file
    /// * `reason` - Short reason description
    /// * `suggestion` - Optional suggestion message (without punctuation)
    /// * `source` - Optional underlying error
    pub fn model_load_error(
        model_path: impl AsRef<std::path::Path>,
        reason: impl Into<String>,
        suggestion: Option<&str>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        let suggestion = suggestion
            .map(|s| format!("; suggested fix: {}", s))
            .unwrap_or_default();
        Self::ModelLoad {
            model_path: model_path.as_ref().display().to_string(),
            reason: reason.into(),
            suggestion,
            source: source.map(|e| Box::new(e) as _),
        }
    }

    /// Creates an error for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates an error for configuration problems.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a configuration error naming the offending field and value.
    pub fn config_error_with_context(field: &str, value: &str, reason: &str) -> Self {
        Self::ConfigError {
            message: format!(
                "Configuration error in field '{}' with value '{}': {}",
                field, value, reason
            ),
        }
    }
}
