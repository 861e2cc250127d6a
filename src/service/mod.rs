//! gRPC front end for the digit classifier.
//!
//! * `config` - Server configuration loaded from JSON and CLI flags
//! * `predict` - The `MLService.Predict` handler
//! * `server` - Listener setup and graceful shutdown
//! * `proto` - Generated protobuf types

pub mod config;
pub mod predict;
pub mod proto;
pub mod server;

pub use config::ServerConfig;
pub use predict::DigitService;
pub use server::{DigitServer, shutdown_signal};
