//! # digit-serve
//!
//! A gRPC inference service for MNIST handwritten digits backed by ONNX Runtime.
//!
//! Each request carries an encoded image in any format the `image` crate can
//! read. The service decodes it, converts it to grayscale, resizes it to 28x28,
//! scales pixels into [0, 1] and returns the digit with the highest model score.
//!
//! ## Modules
//!
//! * [`core`] - Errors, configuration, ONNX Runtime integration and the [`Classifier`](core::Classifier) trait
//! * [`domain`] - Validated values passed between pipeline stages
//! * [`models`] - The digit classifier pipeline
//! * [`processors`] - Decoding, resizing, normalization and top-k ranking
//! * [`service`] - gRPC handler, server configuration and lifecycle
//! * [`utils`] - Image helpers and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use digit_serve::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let model = DigitClassifierBuilder::new()
//!     .session_pool_size(2)
//!     .build(Path::new("models/my_model.onnx"))?;
//!
//! let bytes = std::fs::read("digit.png")?;
//! let prediction = model.predict_bytes(&bytes)?;
//! println!("Predicted digit: {}", prediction.label);
//! # Ok(())
//! # }
//! ```
//!
//! ### Serving
//!
//! ```rust,no_run
//! use digit_serve::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_json_str(r#"{ "model_path": "models/my_model.onnx" }"#)?;
//! DigitServer::from_config(config)?
//!     .serve(shutdown_signal())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod models;
pub mod processors;
pub mod service;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

/// Prelude module for convenient imports.
///
/// ```rust
/// use digit_serve::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{Classifier, ServeError, ServeResult};
    pub use crate::domain::{PredictedLabel, Prediction};
    pub use crate::models::{DigitClassifier, DigitClassifierBuilder};
    pub use crate::service::{DigitServer, ServerConfig, shutdown_signal};
}
