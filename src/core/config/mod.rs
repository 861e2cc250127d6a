//! Configuration types shared by the model and the server.

pub mod errors;
pub mod onnx;

pub use errors::{ConfigError, ConfigValidator};
pub use onnx::{OrtGraphOptimizationLevel, OrtSessionConfig};
