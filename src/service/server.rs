//! Server bootstrap and lifecycle.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

use crate::core::config::ConfigValidator;
use crate::core::errors::ServeError;
use crate::models::{DigitClassifier, DigitClassifierBuilder};
use crate::service::config::ServerConfig;
use crate::service::predict::DigitService;
use crate::service::proto::ml_service_server::MlServiceServer;

/// Headroom over the image limit for the rest of the protobuf message.
const MESSAGE_OVERHEAD_BYTES: usize = 1024;

/// A configured server with its model already loaded.
#[derive(Debug)]
pub struct DigitServer {
    config: ServerConfig,
    model: Arc<DigitClassifier>,
}

impl DigitServer {
    /// Validates `config` and loads the model. Nothing is bound yet, so a
    /// model that fails to load never leaves a listener behind.
    pub fn from_config(config: ServerConfig) -> Result<Self, ServeError> {
        config.validate()?;

        let mut builder = DigitClassifierBuilder::new()
            .session_pool_size(config.session_pool_size)
            .preprocess_config(config.preprocess.clone());
        if let Some(ort) = &config.ort_session {
            builder = builder.with_ort_config(ort.clone());
        }
        if let Some(name) = &config.model_name {
            builder = builder.model_name(name.clone());
        }
        let model = builder.build(&config.model_path)?;

        Ok(Self::with_model(config, Arc::new(model)))
    }

    /// Wraps an already built classifier.
    pub fn with_model(config: ServerConfig, model: Arc<DigitClassifier>) -> Self {
        Self { config, model }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The request handler this server mounts.
    pub fn service(&self) -> DigitService {
        DigitService::new(
            Arc::clone(&self.model),
            self.config.effective_max_concurrent_requests(),
        )
    }

    /// Binds the configured address and serves until `shutdown` resolves.
    pub async fn serve(self, shutdown: impl Future<Output = ()>) -> Result<(), ServeError> {
        let listener = TcpListener::bind(self.config.listen_addr).await?;
        self.serve_with_listener(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` resolves, then
    /// waits for in-flight requests to finish.
    pub async fn serve_with_listener(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), ServeError> {
        let local_addr = listener.local_addr()?;
        let max_message = self
            .model
            .max_image_bytes()
            .saturating_add(MESSAGE_OVERHEAD_BYTES);

        tracing::info!(
            addr = %local_addr,
            model = self.model.model_name(),
            max_concurrent_requests = self.config.effective_max_concurrent_requests(),
            request_timeout_secs = self.config.request_timeout_secs,
            "gRPC server listening"
        );

        let service = MlServiceServer::new(self.service()).max_decoding_message_size(max_message);

        Server::builder()
            .timeout(Duration::from_secs(self.config.request_timeout_secs))
            .add_service(service)
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
            .await?;

        tracing::info!("server stopped");
        Ok(())
    }
}

/// Resolves on Ctrl-C.
///
/// If the signal handler cannot be installed the future never resolves and
/// the process has to be stopped externally.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received, draining requests"),
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::proto::PredictRequest;
    use crate::service::proto::ml_service_client::MlServiceClient;
    use crate::test_support::{MeanIntensity, encode};
    use image::{GrayImage, ImageFormat, Luma};
    use std::path::PathBuf;
    use tokio::sync::oneshot;

    #[test]
    fn test_missing_model_fails_before_binding() {
        let config = ServerConfig {
            model_path: PathBuf::from("models/not-here.onnx"),
            ..ServerConfig::default()
        };
        let err = DigitServer::from_config(config).unwrap_err();
        assert!(matches!(err, ServeError::ModelLoad { .. }));
        assert_eq!(tonic::Status::from(err).code(), tonic::Code::Unavailable);
    }

    #[tokio::test]
    async fn test_loopback_round_trip() {
        let model = DigitClassifierBuilder::new()
            .build_with_classifier(Arc::new(MeanIntensity))
            .unwrap();
        let server = DigitServer::with_model(ServerConfig::default(), Arc::new(model));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve_with_listener(listener, async move {
            let _ = stop_rx.await;
        }));

        let mut client = MlServiceClient::connect(format!("http://{}", addr))
            .await
            .unwrap();

        let white = encode(&GrayImage::from_pixel(56, 56, Luma([255])), ImageFormat::Png);
        let response = client
            .predict(PredictRequest { image: white })
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.digit, 9);
        assert_eq!(response.scores.len(), 10);

        let status = client
            .predict(PredictRequest {
                image: b"\x89PNG\r\n\x1a\n truncated".to_vec(),
            })
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);

        stop_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
