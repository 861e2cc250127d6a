//! Image processing stages for the digit classifier.
//!
//! # Modules
//!
//! * `decode` - Bounded decoding of request bytes into a grayscale image
//! * `resize` - Bilinear or nearest resampling to the model input size
//! * `normalization` - Pixel scaling into model input tensors
//! * `topk` - Ranking of class scores
//! * `types` - Type definitions used across the processors module

pub mod decode;
pub mod normalization;
pub mod resize;
pub mod topk;
pub mod types;

pub use decode::ImageDecoder;
pub use normalization::NormalizeImage;
pub use resize::{pixel_plane, resize_exact};
pub use topk::{Topk, TopkResult};
pub use types::{InputLayout, ResizeFilter};
