//! Error types for the inference service.
//!
//! The variants mirror the stages a request passes through: payload checks,
//! image decoding, preprocessing, model invocation. Model loading is the only
//! fatal kind and happens before the server starts listening.

use thiserror::Error;

/// Stage of the preprocessing pipeline in which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Scaling pixels and laying them out as a tensor.
    Normalization,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Normalization => write!(f, "normalization"),
        }
    }
}

/// A plain message error used as a `source` when no underlying error exists.
#[derive(Debug, Clone)]
pub struct SimpleError {
    message: String,
}

impl SimpleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SimpleError {}

/// Errors produced while loading the model or serving a prediction.
#[derive(Error, Debug)]
pub enum ServeError {
    /// The image bytes could not be decoded into a pixel grid.
    #[error("image decode failed: {context}")]
    Decode {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The request payload is larger than the configured limit.
    #[error("payload too large: {actual} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: usize, actual: usize },

    /// A preprocessing step after decoding failed.
    #[error("{stage} failed: {context}")]
    Processing {
        stage: ProcessingStage,
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The model raised or produced malformed output.
    #[error("inference failed for model '{model_name}': {context}")]
    Inference {
        model_name: String,
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The model artifact could not be loaded.
    #[error("failed to load model '{model_path}': {reason}{suggestion}")]
    ModelLoad {
        model_path: String,
        reason: String,
        suggestion: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError { message: String },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor shape operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// Error from the gRPC transport while binding or serving.
    #[error("transport")]
    Transport(#[from] tonic::transport::Error),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl ServeError {
    /// Whether this error is caused by the request itself rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServeError::Decode { .. }
                | ServeError::PayloadTooLarge { .. }
                | ServeError::InvalidInput { .. }
        )
    }
}

impl From<image::ImageError> for ServeError {
    fn from(error: image::ImageError) -> Self {
        Self::decode_error("unsupported or malformed image", error)
    }
}

impl From<crate::core::config::ConfigError> for ServeError {
    fn from(error: crate::core::config::ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}

impl From<ServeError> for tonic::Status {
    fn from(error: ServeError) -> Self {
        let message = error.to_string();
        match error {
            ServeError::Decode { .. } | ServeError::InvalidInput { .. } => {
                tonic::Status::invalid_argument(message)
            }
            ServeError::PayloadTooLarge { .. } => tonic::Status::resource_exhausted(message),
            ServeError::ModelLoad { .. } => tonic::Status::unavailable(message),
            _ => tonic::Status::internal(message),
        }
    }
}
