//! Error types for the inference service.
//!
//! # Usage
//!
//! ```rust
//! use digit_serve::core::errors::ServeError;
//!
//! let error = ServeError::decode_message("empty image buffer");
//! assert!(error.is_client_error());
//!
//! let status: tonic::Status = error.into();
//! assert_eq!(status.code(), tonic::Code::InvalidArgument);
//! ```

pub mod constructors;
pub mod types;

pub use types::{ProcessingStage, ServeError, SimpleError};

/// Convenient result alias for service operations.
pub type ServeResult<T> = Result<T, ServeError>;
