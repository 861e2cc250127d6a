//! MNIST digit classification model.
//!
//! [`DigitClassifier`] runs the full request pipeline on raw image bytes:
//! bounded decode, grayscale conversion, resize to 28x28, scaling to [0, 1],
//! the model forward pass, and argmax. It holds no per-request state and is
//! shared across requests behind an `Arc`.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::core::config::{ConfigValidator, OrtSessionConfig};
use crate::core::constants::{
    DEFAULT_MAX_IMAGE_BYTES, DEFAULT_MAX_IMAGE_DIMENSION, INPUT_HEIGHT, INPUT_WIDTH,
};
use crate::core::inference::OrtInfer;
use crate::core::traits::Classifier;
use crate::core::{ConfigError, ServeError};
use crate::domain::{NormalizedTensor, Prediction, ScoreVector};
use crate::processors::{ImageDecoder, InputLayout, NormalizeImage, ResizeFilter, resize_exact};

/// Configuration for digit model preprocessing.
///
/// Pixels are always divided by 255; there is no scale setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreprocessConfig {
    /// Resizing filter to use
    pub resize_filter: ResizeFilter,
    /// Tensor layout; inferred from the model input when unset
    pub layout: Option<InputLayout>,
    /// Largest encoded image accepted, in bytes
    pub max_image_bytes: usize,
    /// Largest decoded width or height accepted, in pixels
    pub max_image_dimension: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            resize_filter: ResizeFilter::default(),
            layout: None,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_image_dimension: DEFAULT_MAX_IMAGE_DIMENSION,
        }
    }
}

impl ConfigValidator for PreprocessConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_positive("max_image_bytes", self.max_image_bytes)?;
        self.validate_image_dimensions(self.max_image_dimension, self.max_image_dimension)?;
        Ok(())
    }
}

/// Digit classifier: the preprocessing pipeline wrapped around a [`Classifier`].
#[derive(Debug)]
pub struct DigitClassifier {
    /// Model forward pass
    classifier: Arc<dyn Classifier>,
    /// Bounded decoder for request bytes
    decoder: ImageDecoder,
    /// Pixel scaling and layout
    normalizer: NormalizeImage,
    /// Resizing filter
    resize_filter: ResizeFilter,
}

impl DigitClassifier {
    /// Rejects empty or oversized payloads without decoding them.
    pub fn check_payload(&self, bytes: &[u8]) -> Result<(), ServeError> {
        self.decoder.check_payload(bytes)
    }

    /// Decodes raw image bytes into a grayscale image.
    pub fn decode(&self, bytes: &[u8]) -> Result<GrayImage, ServeError> {
        self.decoder.decode(bytes)
    }

    /// Resizes and normalizes a decoded image into model input.
    pub fn preprocess(&self, image: &GrayImage) -> Result<NormalizedTensor, ServeError> {
        let resized = resize_exact(image, INPUT_WIDTH, INPUT_HEIGHT, self.resize_filter);
        self.normalizer.normalize(resized.view())
    }

    /// Decodes and preprocesses raw image bytes.
    pub fn preprocess_bytes(&self, bytes: &[u8]) -> Result<NormalizedTensor, ServeError> {
        let image = self.decode(bytes)?;
        self.preprocess(&image)
    }

    /// Runs the model on a normalized tensor.
    pub fn infer(&self, tensor: &NormalizedTensor) -> Result<ScoreVector, ServeError> {
        self.classifier.classify(tensor)
    }

    /// Picks the predicted digit from the model scores.
    pub fn postprocess(&self, scores: ScoreVector) -> Prediction {
        Prediction::from_scores(scores)
    }

    /// Performs complete forward pass: decode -> preprocess -> infer -> postprocess.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Encoded image in any supported container format
    ///
    /// # Returns
    ///
    /// The predicted digit with its confidence and the full score vector
    pub fn predict_bytes(&self, bytes: &[u8]) -> Result<Prediction, ServeError> {
        let start = Instant::now();
        let tensor = self.preprocess_bytes(bytes)?;
        let scores = self.infer(&tensor)?;
        let prediction = self.postprocess(scores);
        tracing::debug!(
            model = self.classifier.model_name(),
            payload_bytes = bytes.len(),
            digit = prediction.label.digit(),
            confidence = prediction.confidence,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "prediction complete"
        );
        Ok(prediction)
    }

    pub fn model_name(&self) -> &str {
        self.classifier.model_name()
    }

    pub fn engine_info(&self) -> String {
        self.classifier.engine_info()
    }

    /// The tensor layout fed to the model.
    pub fn layout(&self) -> InputLayout {
        self.normalizer.layout
    }

    pub fn resize_filter(&self) -> ResizeFilter {
        self.resize_filter
    }

    /// Encoded size limit enforced before decoding.
    pub fn max_image_bytes(&self) -> usize {
        self.decoder.max_image_bytes()
    }
}

/// Builder for [`DigitClassifier`].
#[derive(Debug)]
pub struct DigitClassifierBuilder {
    /// Session pool size for ONNX Runtime
    session_pool_size: usize,
    /// Preprocessing configuration
    preprocess_config: PreprocessConfig,
    /// ONNX Runtime session configuration
    ort_config: Option<OrtSessionConfig>,
    /// Name used in logs; defaults to the model file stem
    model_name: Option<String>,
}

impl Default for DigitClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DigitClassifierBuilder {
    pub fn new() -> Self {
        Self {
            session_pool_size: 1,
            preprocess_config: PreprocessConfig::default(),
            ort_config: None,
            model_name: None,
        }
    }

    /// Sets the session pool size for ONNX Runtime.
    pub fn session_pool_size(mut self, size: usize) -> Self {
        self.session_pool_size = size;
        self
    }

    /// Sets the preprocessing configuration.
    pub fn preprocess_config(mut self, config: PreprocessConfig) -> Self {
        self.preprocess_config = config;
        self
    }

    /// Sets the resizing filter.
    pub fn resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.preprocess_config.resize_filter = filter;
        self
    }

    /// Forces the input layout instead of inferring it from the model.
    pub fn layout(mut self, layout: InputLayout) -> Self {
        self.preprocess_config.layout = Some(layout);
        self
    }

    /// Sets the ONNX Runtime session configuration.
    pub fn with_ort_config(mut self, config: OrtSessionConfig) -> Self {
        self.ort_config = Some(config);
        self
    }

    pub fn model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }

    /// Loads the ONNX model at `model_path` and builds the classifier.
    ///
    /// # Errors
    ///
    /// Returns `ServeError::ModelLoad` if the file is missing, is not a valid
    /// model, or declares an input that cannot take a 28x28 grayscale image.
    pub fn build(self, model_path: &Path) -> Result<DigitClassifier, ServeError> {
        let inference = OrtInfer::from_config(
            self.ort_config.as_ref(),
            self.session_pool_size,
            model_path,
            self.model_name.as_deref(),
        )?;
        self.build_with_classifier(Arc::new(inference))
    }

    /// Builds the pipeline around an already loaded classifier.
    pub fn build_with_classifier(
        self,
        classifier: Arc<dyn Classifier>,
    ) -> Result<DigitClassifier, ServeError> {
        self.preprocess_config.validate()?;

        let layout = resolve_layout(classifier.as_ref(), self.preprocess_config.layout)?;

        let normalizer = NormalizeImage::new(Some(layout));

        let decoder = ImageDecoder::new(
            self.preprocess_config.max_image_bytes,
            self.preprocess_config.max_image_dimension,
        );

        tracing::info!(
            model = classifier.model_name(),
            engine = %classifier.engine_info(),
            input_shape = ?classifier.input_shape(),
            layout = %layout,
            resize_filter = %self.preprocess_config.resize_filter,
            "digit classifier ready"
        );

        Ok(DigitClassifier {
            classifier,
            decoder,
            normalizer,
            resize_filter: self.preprocess_config.resize_filter,
        })
    }
}

/// Picks the tensor layout from the model's declared input, checking it
/// against an explicitly configured one.
fn resolve_layout(
    classifier: &dyn Classifier,
    configured: Option<InputLayout>,
) -> Result<InputLayout, ServeError> {
    let Some(shape) = classifier.input_shape() else {
        return Ok(configured.unwrap_or_default());
    };

    match InputLayout::infer_from_shape(&shape, INPUT_HEIGHT, INPUT_WIDTH) {
        Ok(Some(inferred)) => match configured {
            Some(layout) if layout != inferred => Err(ServeError::model_load_error(
                classifier.model_name(),
                format!(
                    "configured input layout {} does not match model input shape {:?}",
                    layout, shape
                ),
                Some("remove input_layout from the configuration or set it to match the model"),
                None::<std::io::Error>,
            )),
            _ => Ok(inferred),
        },
        Ok(None) => Ok(configured.unwrap_or_default()),
        Err(reason) => Err(ServeError::model_load_error(
            classifier.model_name(),
            reason,
            Some("export the model with a [N, 28, 28, 1] or [N, 1, 28, 28] input"),
            None::<std::io::Error>,
        )),
    }
}
