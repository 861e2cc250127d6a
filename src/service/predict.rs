//! The `MLService.Predict` handler.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tonic::{Request, Response, Status};

use crate::core::errors::ServeError;
use crate::domain::Prediction;
use crate::models::DigitClassifier;
use crate::service::proto::ml_service_server::MlService;
use crate::service::proto::{PredictRequest, PredictResponse};

/// Serves predictions from a shared, read-only [`DigitClassifier`].
///
/// Cloning is cheap; clones share the model and the in-flight request limit.
#[derive(Debug, Clone)]
pub struct DigitService {
    model: Arc<DigitClassifier>,
    permits: Arc<Semaphore>,
}

impl DigitService {
    /// Creates a service allowing at most `max_concurrent_requests` predictions at once.
    pub fn new(model: Arc<DigitClassifier>, max_concurrent_requests: usize) -> Self {
        Self {
            model,
            permits: Arc::new(Semaphore::new(max_concurrent_requests.max(1))),
        }
    }

    pub fn model(&self) -> &Arc<DigitClassifier> {
        &self.model
    }

    /// Runs the full pipeline on `image` off the async worker threads.
    ///
    /// Size checks happen before a permit is taken, so oversized payloads are
    /// rejected even when the server is saturated.
    pub async fn predict_image(&self, image: Vec<u8>) -> Result<Prediction, ServeError> {
        self.model.check_payload(&image)?;

        let permit = self.permits.clone().acquire_owned().await.map_err(|e| {
            ServeError::inference_error(self.model.model_name(), "request limiter closed", e)
        })?;

        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            model.predict_bytes(&image)
        })
        .await
        .map_err(|e| {
            ServeError::inference_error(self.model.model_name(), "prediction task failed", e)
        })?
    }
}

#[tonic::async_trait]
impl MlService for DigitService {
    async fn predict(
        &self,
        request: Request<PredictRequest>,
    ) -> Result<Response<PredictResponse>, Status> {
        let remote = request.remote_addr();
        let image = request.into_inner().image;
        let payload_bytes = image.len();

        match self.predict_image(image).await {
            Ok(prediction) => Ok(Response::new(PredictResponse {
                digit: i32::from(prediction.label.digit()),
                confidence: prediction.confidence,
                scores: prediction.scores.into_vec(),
            })),
            Err(err) => {
                if err.is_client_error() {
                    tracing::warn!(?remote, payload_bytes, error = %err, "rejected predict request");
                } else {
                    tracing::error!(?remote, payload_bytes, error = %err, "predict request failed");
                }
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DigitClassifierBuilder, PreprocessConfig};
    use crate::test_support::{Failing, FixedScores, MeanIntensity, encode, gradient};
    use image::ImageFormat;
    use tonic::Code;

    fn service_with(classifier: impl crate::core::Classifier + 'static) -> DigitService {
        let config = PreprocessConfig {
            max_image_bytes: 64 * 1024,
            ..PreprocessConfig::default()
        };
        let model = DigitClassifierBuilder::new()
            .preprocess_config(config)
            .build_with_classifier(Arc::new(classifier))
            .unwrap();
        DigitService::new(Arc::new(model), 2)
    }

    async fn call(service: &DigitService, image: Vec<u8>) -> Result<PredictResponse, Status> {
        service
            .predict(Request::new(PredictRequest { image }))
            .await
            .map(Response::into_inner)
    }

    #[tokio::test]
    async fn test_predict_returns_digit_and_scores() {
        let mut scores = vec![0.0; 10];
        scores[4] = 0.75;
        let service = service_with(FixedScores::new(scores));
        let image = encode(&gradient(32, 32), ImageFormat::Png);

        let response = call(&service, image).await.unwrap();
        assert_eq!(response.digit, 4);
        assert!((response.confidence - 0.75).abs() < f32::EPSILON);
        assert_eq!(response.scores.len(), 10);
    }

    #[tokio::test]
    async fn test_invalid_image_is_invalid_argument() {
        let service = service_with(MeanIntensity);
        let status = call(&service, b"GIF89a but not really".to_vec())
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = call(&service, Vec::new()).await.unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_oversized_payload_is_resource_exhausted() {
        let service = service_with(MeanIntensity);
        let status = call(&service, vec![0u8; 64 * 1024 + 1]).await.unwrap_err();
        assert_eq!(status.code(), Code::ResourceExhausted);
    }

    #[tokio::test]
    async fn test_model_failure_is_internal() {
        let service = service_with(Failing);
        let image = encode(&gradient(28, 28), ImageFormat::Png);
        let status = call(&service, image).await.unwrap_err();
        assert_eq!(status.code(), Code::Internal);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_the_model() {
        let service = service_with(MeanIntensity);
        let image = encode(&gradient(28, 28), ImageFormat::Png);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            let image = image.clone();
            handles.push(tokio::spawn(async move { call(&service, image).await }));
        }

        let mut digits = Vec::new();
        for handle in handles {
            digits.push(handle.await.unwrap().unwrap().digit);
        }
        assert!(digits.iter().all(|d| *d == digits[0]));
        assert_eq!(service.permits.available_permits(), 2);
    }
}
