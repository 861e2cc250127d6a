//! ONNX Runtime inference for the digit classifier.
//!
//! [`OrtInfer`] owns a small pool of sessions over the same model file and
//! implements [`Classifier`](crate::core::traits::Classifier), so the rest of
//! the crate never touches `ort` types directly.

pub mod ort_infer;
pub mod session;

pub use ort_infer::OrtInfer;
pub use session::load_session;
