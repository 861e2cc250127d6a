//! Helpers for working directly with ONNX Runtime sessions.

use crate::core::config::{OrtGraphOptimizationLevel, OrtSessionConfig};
use crate::core::errors::ServeError;
use ort::logging::LogLevel;
use ort::session::Session;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use std::path::Path;

/// Loads one session for the model at `model_path`.
///
/// The path is checked before ONNX Runtime sees it so a missing file is
/// reported plainly rather than as a runtime error.
pub fn load_session(
    model_path: impl AsRef<Path>,
    ort_config: Option<&OrtSessionConfig>,
) -> Result<Session, ServeError> {
    let path = model_path.as_ref();
    if !path.is_file() {
        return Err(ServeError::model_load_error(
            path,
            "model file not found",
            Some("check --model-path or the model_path config field"),
            None::<std::io::Error>,
        ));
    }

    // Keep ORT quiet; load failures surface through ServeError instead.
    let builder = Session::builder()?.with_log_level(LogLevel::Error)?;
    let builder = match ort_config {
        Some(cfg) => apply_ort_config(builder, cfg)?,
        None => builder,
    };

    builder.commit_from_file(path).map_err(|e| {
        ServeError::model_load_error(
            path,
            "failed to create ONNX session",
            Some("verify the file is a valid ONNX model"),
            Some(e),
        )
    })
}

fn apply_ort_config(
    mut builder: SessionBuilder,
    cfg: &OrtSessionConfig,
) -> Result<SessionBuilder, ort::Error> {
    if let Some(intra) = cfg.intra_threads {
        builder = builder.with_intra_threads(intra)?;
    }
    if let Some(inter) = cfg.inter_threads {
        builder = builder.with_inter_threads(inter)?;
    }
    if let Some(par) = cfg.parallel_execution {
        builder = builder.with_parallel_execution(par)?;
    }
    if let Some(level) = cfg.optimization_level {
        let mapped = match level {
            OrtGraphOptimizationLevel::DisableAll => GraphOptimizationLevel::Disable,
            OrtGraphOptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
            OrtGraphOptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
            OrtGraphOptimizationLevel::Level3 | OrtGraphOptimizationLevel::All => {
                GraphOptimizationLevel::Level3
            }
        };
        builder = builder.with_optimization_level(mapped)?;
    }
    Ok(builder)
}
