//! MNIST digit inference server.
//!
//! Loads an ONNX digit classifier once and serves `MLService.Predict` over gRPC.
//!
//! # Usage
//!
//! ```bash
//! digit-serve [OPTIONS]
//! ```
//!
//! Options given on the command line override values from `--config`.
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=debug digit-serve --model-path models/my_model.onnx --listen 127.0.0.1:50051
//! ```

use clap::Parser;
use digit_serve::core::constants::DEFAULT_LISTEN_ADDR;
use digit_serve::processors::{InputLayout, ResizeFilter};
use digit_serve::service::{DigitServer, ServerConfig, shutdown_signal};
use digit_serve::utils::init_tracing;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments for the inference server
#[derive(Parser)]
#[command(name = "digit-serve")]
#[command(about = "gRPC inference server for MNIST digit classification")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the ONNX model file
    #[arg(short, long)]
    model_path: Option<PathBuf>,

    #[arg(short, long, help = format!("Address to listen on [default: {}]", DEFAULT_LISTEN_ADDR))]
    listen: Option<SocketAddr>,

    /// Number of ONNX Runtime sessions
    #[arg(long)]
    session_pool_size: Option<usize>,

    /// Largest accepted image payload, in bytes
    #[arg(long)]
    max_image_bytes: Option<usize>,

    /// Bound on in-flight predictions
    #[arg(long)]
    max_concurrent_requests: Option<usize>,

    /// Per-request timeout, in seconds
    #[arg(long)]
    request_timeout_secs: Option<u64>,

    /// Resize interpolation ('bilinear' or 'nearest')
    #[arg(long)]
    resize_filter: Option<ResizeFilter>,

    /// Model input layout ('nhwc' or 'nchw'); inferred from the model when omitted
    #[arg(long)]
    input_layout: Option<InputLayout>,
}

impl Args {
    /// Builds the server configuration: file values first, then flag overrides.
    fn into_config(self) -> Result<ServerConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_json_file(path)?,
            None => ServerConfig::default(),
        };

        if let Some(path) = self.model_path {
            config.model_path = path;
        }
        if let Some(addr) = self.listen {
            config.listen_addr = addr;
        }
        if let Some(size) = self.session_pool_size {
            config.session_pool_size = size;
        }
        if let Some(bytes) = self.max_image_bytes {
            config.preprocess.max_image_bytes = bytes;
        }
        if let Some(limit) = self.max_concurrent_requests {
            config.max_concurrent_requests = Some(limit);
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout_secs = secs;
        }
        if let Some(filter) = self.resize_filter {
            config.preprocess.resize_filter = filter;
        }
        if let Some(layout) = self.input_layout {
            config.preprocess.layout = Some(layout);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = Args::parse();
    let config = args.into_config()?;

    info!(
        model_path = %config.model_path.display(),
        listen = %config.listen_addr,
        session_pool_size = config.session_pool_size,
        max_image_bytes = config.preprocess.max_image_bytes,
        resize_filter = %config.preprocess.resize_filter,
        "starting digit-serve"
    );

    let server = match DigitServer::from_config(config) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = server.serve(shutdown_signal()).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
