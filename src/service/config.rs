//! Server configuration.
//!
//! Values come from an optional JSON file with defaults for every field, then
//! command-line overrides, then [`ConfigValidator::validate`].

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::config::{ConfigError, ConfigValidator, OrtSessionConfig};
use crate::core::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::models::PreprocessConfig;

/// Configuration for the gRPC server and the model it serves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server listens on
    pub listen_addr: SocketAddr,
    /// Path to the ONNX model file
    pub model_path: PathBuf,
    /// Name used in logs; defaults to the model file stem
    pub model_name: Option<String>,
    /// Number of ONNX Runtime sessions
    pub session_pool_size: usize,
    /// Bound on in-flight predictions; defaults to twice the session pool size
    pub max_concurrent_requests: Option<usize>,
    /// Per-request deadline enforced by the transport
    pub request_timeout_secs: u64,
    /// Image decoding and preprocessing
    pub preprocess: PreprocessConfig,
    /// ONNX Runtime session settings
    pub ort_session: Option<OrtSessionConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 50051)),
            model_path: PathBuf::from("models/my_model.onnx"),
            model_name: None,
            session_pool_size: 1,
            max_concurrent_requests: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            preprocess: PreprocessConfig::default(),
            ort_session: None,
        }
    }
}

impl ServerConfig {
    /// Parses a configuration from JSON text. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::InvalidConfig {
            message: format!("malformed server configuration: {}", e),
        })
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The in-flight request bound actually applied.
    pub fn effective_max_concurrent_requests(&self) -> usize {
        self.max_concurrent_requests
            .unwrap_or_else(|| self.session_pool_size.saturating_mul(2))
            .max(1)
    }
}

impl ConfigValidator for ServerConfig {
    // The model path is not checked here: a missing model is reported by the
    // loader as a model load failure.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.model_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfig {
                message: "model_path must not be empty".to_string(),
            });
        }
        self.validate_positive("session_pool_size", self.session_pool_size)?;
        if let Some(limit) = self.max_concurrent_requests {
            self.validate_positive("max_concurrent_requests", limit)?;
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig {
                message: "request_timeout_secs must be greater than 0".to_string(),
            });
        }
        self.preprocess.validate()
    }
}
