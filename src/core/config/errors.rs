//! Configuration error types and validation traits.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Error indicating that a configuration file could not be read or parsed.
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed {
        path: std::path::PathBuf,
        message: String,
    },
}

/// A trait for validating configuration parameters.
///
/// Implementors provide [`validate`](ConfigValidator::validate); the helper
/// methods cover checks shared between configuration types.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Checks that image dimensions are positive.
    fn validate_image_dimensions(&self, width: u32, height: u32) -> Result<(), ConfigError> {
        if width == 0 || height == 0 {
            Err(ConfigError::InvalidConfig {
                message: "Image dimensions must be positive".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Checks that a count-style limit is at least one.
    fn validate_positive(&self, field: &str, value: usize) -> Result<(), ConfigError> {
        if value == 0 {
            Err(ConfigError::InvalidConfig {
                message: format!("{} must be greater than 0", field),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;

    impl ConfigValidator for Probe {
        fn validate(&self) -> Result<(), ConfigError> {
            Ok(())
        }
    }

    #[test]
    fn test_validate_image_dimensions() {
        assert!(Probe.validate_image_dimensions(28, 28).is_ok());
        assert!(Probe.validate_image_dimensions(0, 28).is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(Probe.validate_positive("session_pool_size", 1).is_ok());
        let err = Probe.validate_positive("session_pool_size", 0).unwrap_err();
        assert!(err.to_string().contains("session_pool_size"));
    }
}
