//! Generated gRPC types for the `ml` package.
#![allow(clippy::derive_partial_eq_without_eq)]

tonic::include_proto!("ml");
