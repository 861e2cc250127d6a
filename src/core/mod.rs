//! The core module of the inference service.
//!
//! This module contains the fundamental components shared by the request
//! pipeline and the server:
//! - Tensor aliases
//! - Configuration types
//! - Constants for the model input and service limits
//! - Error handling
//! - ONNX Runtime integration
//! - The [`Classifier`] trait

pub mod batch;
pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;
pub mod traits;

pub use batch::{Tensor2D, Tensor4D};
pub use config::{ConfigError, ConfigValidator, OrtGraphOptimizationLevel, OrtSessionConfig};
pub use constants::*;
pub use errors::{ProcessingStage, ServeError, ServeResult};
pub use inference::{OrtInfer, load_session};
pub use traits::Classifier;
