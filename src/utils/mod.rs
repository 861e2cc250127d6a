//! Utility functions shared by the library and the binaries.
//!
//! This module provides image helpers and logging setup.

pub mod image;

pub use image::{dynamic_to_gray, read_image_bytes};

/// Initializes the tracing subscriber for logging.
///
/// Filtering follows `RUST_LOG` and falls back to `info` when it is unset or
/// invalid. Call once at the start of a binary.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
