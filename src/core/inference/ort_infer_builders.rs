use super::*;
use crate::core::config::OrtSessionConfig;
use crate::core::inference::session::load_session;
use std::path::Path;

impl OrtInfer {
    /// Creates an engine with default ONNX Runtime settings and a single session.
    ///
    /// When `input_name` is `None` the model's first declared input is used.
    pub fn new(model_path: impl AsRef<Path>, input_name: Option<&str>) -> Result<Self, ServeError> {
        let path = model_path.as_ref();
        let session = load_session(path, None)?;
        let input_name = match input_name {
            Some(name) => name.to_string(),
            None => Self::discover_input_name(&session, path)?,
        };

        Ok(OrtInfer {
            sessions: vec![Mutex::new(session)],
            next_idx: std::sync::atomic::AtomicUsize::new(0),
            input_name,
            model_path: path.to_path_buf(),
            model_name: Self::default_model_name(path),
        })
    }

    /// Creates an engine with a pool of `pool_size` sessions, each built with
    /// the given ORT settings. The input name is read from the first session.
    pub fn from_config(
        ort_config: Option<&OrtSessionConfig>,
        pool_size: usize,
        model_path: impl AsRef<Path>,
        model_name: Option<&str>,
    ) -> Result<Self, ServeError> {
        let path = model_path.as_ref();
        let pool_size = pool_size.max(1);
        let mut sessions = Vec::with_capacity(pool_size);

        let first_session = load_session(path, ort_config)?;
        let input_name = Self::discover_input_name(&first_session, path)?;
        sessions.push(Mutex::new(first_session));

        for _ in 1..pool_size {
            sessions.push(Mutex::new(load_session(path, ort_config)?));
        }

        let model_name = model_name
            .map(str::to_string)
            .unwrap_or_else(|| Self::default_model_name(path));

        tracing::debug!(
            model = %model_name,
            pool_size,
            input = %input_name,
            "created ONNX session pool"
        );

        Ok(OrtInfer {
            sessions,
            next_idx: std::sync::atomic::AtomicUsize::new(0),
            input_name,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    fn discover_input_name(session: &Session, path: &Path) -> Result<String, ServeError> {
        session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| {
                ServeError::model_load_error(
                    path,
                    "model declares no inputs",
                    Some("export the model with a single image input"),
                    None::<std::io::Error>,
                )
            })
    }

    fn default_model_name(path: &Path) -> String {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string()
    }
}
