use super::*;
use crate::core::config::{OrtExecutionProvider, OrtGraphOptimizationLevel, OrtSessionConfig};
use ort::execution_providers::ExecutionProviderDispatch;
use ort::logging::LogLevel;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use std::path::Path;

impl OrtInfer {
    /// Creates an OrtInfer with default ONNX Runtime settings and one session.
    ///
    /// When `input_name` is `None` the name of the model's first input is used.
    pub fn new(
        model_path: impl AsRef<Path>,
        input_name: Option<&str>,
    ) -> Result<Self, VisionError> {
        Self::with_pool(model_path, input_name, 1, None)
    }

    /// Creates an OrtInfer instance with `pool_size` sessions built from `ort_config`.
    pub fn with_pool(
        model_path: impl AsRef<Path>,
        input_name: Option<&str>,
        pool_size: usize,
        ort_config: Option<&OrtSessionConfig>,
    ) -> Result<Self, VisionError> {
        let path = model_path.as_ref();
        if !path.is_file() {
            return Err(VisionError::model_load_error(
                path,
                "model file not found",
                None::<std::io::Error>,
            ));
        }

        let pool_size = pool_size.max(1);
        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let builder = Session::builder()?;
            let builder = match ort_config {
                Some(cfg) => Self::apply_ort_config(builder, cfg)?,
                // Keep ORT quiet unless configured otherwise
                None => builder.with_log_level(LogLevel::Error)?,
            };
            let session = builder.commit_from_file(path).map_err(|e| {
                VisionError::model_load_error(path, "failed to create ONNX session", Some(e))
            })?;
            sessions.push(Mutex::new(session));
        }

        let (discovered_input, output_name) = {
            let first = sessions[0].lock().map_err(|_| {
                VisionError::model_load_error(
                    path,
                    "session mutex poisoned during load",
                    None::<std::io::Error>,
                )
            })?;
            (
                first.inputs.first().map(|i| i.name.clone()),
                first.outputs.first().map(|o| o.name.clone()),
            )
        };
        let input_name = input_name
            .map(str::to_string)
            .or(discovered_input)
            .ok_or_else(|| {
                VisionError::model_load_error(
                    path,
                    "model declares no inputs",
                    None::<std::io::Error>,
                )
            })?;
        let output_name = output_name.ok_or_else(|| {
            VisionError::model_load_error(path, "model declares no outputs", None::<std::io::Error>)
        })?;

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        Ok(OrtInfer {
            sessions,
            next_idx: std::sync::atomic::AtomicUsize::new(0),
            input_name,
            output_name,
            model_path: path.to_path_buf(),
            model_name,
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
        if let Some(level) = cfg.optimization_level {
            let mapped = match level {
                OrtGraphOptimizationLevel::Disabled => GraphOptimizationLevel::Disable,
                OrtGraphOptimizationLevel::Basic => GraphOptimizationLevel::Level1,
                OrtGraphOptimizationLevel::Extended => GraphOptimizationLevel::Level2,
                OrtGraphOptimizationLevel::All => GraphOptimizationLevel::Level3,
            };
            builder = builder.with_optimization_level(mapped)?;
        }
        let providers = Self::build_execution_providers(&cfg.get_execution_providers())?;
        if !providers.is_empty() {
            builder = builder.with_execution_providers(providers)?;
        }
        Ok(builder)
    }

    fn build_execution_providers(
        eps: &[OrtExecutionProvider],
    ) -> Result<Vec<ExecutionProviderDispatch>, ort::Error> {
        let mut providers = Vec::with_capacity(eps.len());
        for ep in eps {
            match ep {
                OrtExecutionProvider::CPU => {
                    providers
                        .push(ort::execution_providers::CPUExecutionProvider::default().build());
                }
                #[cfg(feature = "cuda")]
                OrtExecutionProvider::CUDA { device_id } => {
                    let mut cuda_provider =
                        ort::execution_providers::CUDAExecutionProvider::default();
                    if let Some(id) = device_id {
                        cuda_provider = cuda_provider.with_device_id(*id);
                    }
                    providers.push(cuda_provider.build());
                }
                #[cfg(not(feature = "cuda"))]
                OrtExecutionProvider::CUDA { .. } => {
                    return Err(ort::Error::new(
                        "CUDA execution provider requested but cuda feature is not enabled",
                    ));
                }
            }
        }
        Ok(providers)
    }
}
