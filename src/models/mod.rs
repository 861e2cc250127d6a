//! Model wrappers for the inference service.
//!
//! A model here owns its preprocessing and postprocessing and delegates the
//! forward pass to a [`Classifier`](crate::core::traits::Classifier).

pub mod classification;

pub use classification::*;
