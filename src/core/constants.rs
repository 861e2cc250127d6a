//! Constants shared across the serving pipeline.

/// Height of the model input, in pixels.
pub const INPUT_HEIGHT: u32 = 28;

/// Width of the model input, in pixels.
pub const INPUT_WIDTH: u32 = 28;

/// Number of channels in the model input (grayscale).
pub const INPUT_CHANNELS: usize = 1;

/// Number of digit classes the model scores.
pub const NUM_CLASSES: usize = 10;

/// Factor mapping 8-bit pixel intensities onto [0, 1].
pub const PIXEL_SCALE: f32 = 1.0 / 255.0;

/// Default upper bound on the encoded image size accepted per request.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;

/// Default upper bound on either side of a decoded image.
pub const DEFAULT_MAX_IMAGE_DIMENSION: u32 = 4096;

/// Default listen address for the gRPC server.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:50051";

/// Default per-request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
