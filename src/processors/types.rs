//! Types used in image processing operations.
//!
//! These enums select the resampling filter and the tensor layout used when
//! preparing an image for the classifier.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::constants::INPUT_CHANNELS;
use crate::core::errors::ServeError;

/// Interpolation used to resize decoded images to the model input size.
///
/// The classifier is sensitive to the resampling method, so the choice is
/// fixed for the lifetime of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    /// Nearest-neighbour sampling.
    Nearest,
    /// Two-tap bilinear interpolation with half-pixel centers and no
    /// antialiasing, as used by TensorFlow's default image resize.
    #[default]
    Bilinear,
}

impl FromStr for ResizeFilter {
    type Err = ServeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(ResizeFilter::Nearest),
            "bilinear" => Ok(ResizeFilter::Bilinear),
            other => Err(ServeError::config_error_with_context(
                "resize_filter",
                other,
                "expected 'nearest' or 'bilinear'",
            )),
        }
    }
}

impl std::fmt::Display for ResizeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResizeFilter::Nearest => write!(f, "nearest"),
            ResizeFilter::Bilinear => write!(f, "bilinear"),
        }
    }
}

/// Memory layout of the single-sample input batch.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputLayout {
    /// Batch, Height, Width, Channel order (common in TensorFlow and Keras)
    #[default]
    NHWC,
    /// Batch, Channel, Height, Width order (common in PyTorch)
    NCHW,
}

impl InputLayout {
    /// Shape of a batch of `batch` images of `height` x `width` in this layout.
    pub fn batch_shape(self, batch: usize, height: usize, width: usize) -> [usize; 4] {
        match self {
            InputLayout::NHWC => [batch, height, width, INPUT_CHANNELS],
            InputLayout::NCHW => [batch, INPUT_CHANNELS, height, width],
        }
    }

    /// Works out the layout a model expects from its declared input shape.
    ///
    /// Non-positive dimensions are treated as dynamic. Returns `Ok(None)` when
    /// the declared shape fits both layouts, and an error message when it fits
    /// neither.
    pub fn infer_from_shape(
        shape: &[i64],
        height: u32,
        width: u32,
    ) -> Result<Option<Self>, String> {
        if shape.len() != 4 {
            return Err(format!(
                "expected a rank-4 input, model declares shape {:?}",
                shape
            ));
        }

        let fits = |dim: i64, expected: usize| dim <= 0 || dim as usize == expected;
        let (h, w) = (height as usize, width as usize);
        let nhwc = fits(shape[1], h) && fits(shape[2], w) && fits(shape[3], INPUT_CHANNELS);
        let nchw = fits(shape[1], INPUT_CHANNELS) && fits(shape[2], h) && fits(shape[3], w);

        match (nhwc, nchw) {
            (true, true) => Ok(None),
            (true, false) => Ok(Some(InputLayout::NHWC)),
            (false, true) => Ok(Some(InputLayout::NCHW)),
            (false, false) => Err(format!(
                "model input shape {:?} is not compatible with {}x{}x{}",
                shape, h, w, INPUT_CHANNELS
            )),
        }
    }
}

impl FromStr for InputLayout {
    type Err = ServeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nhwc" => Ok(InputLayout::NHWC),
            "nchw" => Ok(InputLayout::NCHW),
            other => Err(ServeError::config_error_with_context(
                "input_layout",
                other,
                "expected 'nhwc' or 'nchw'",
            )),
        }
    }
}

impl std::fmt::Display for InputLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputLayout::NHWC => write!(f, "nhwc"),
            InputLayout::NCHW => write!(f, "nchw"),
        }
    }
}
