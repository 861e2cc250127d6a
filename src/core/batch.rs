//! Tensor aliases used at the model boundary.

/// A 2-dimensional tensor of f32 values, `[batch, classes]` for classifier output.
pub type Tensor2D = ndarray::Array2<f32>;

/// A 4-dimensional tensor of f32 values, the model input layout.
pub type Tensor4D = ndarray::Array4<f32>;
