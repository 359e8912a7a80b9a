//! Service-level configuration.

use super::errors::{ConfigError, ConfigValidator};
use super::onnx::OrtSessionConfig;
use crate::core::constants::{
    DEFAULT_HOST, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PARALLEL_THRESHOLD, DEFAULT_PORT,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration of the classification service.
///
/// Loaded from a JSON file with [`ServiceConfig::from_json_file`]; every field
/// has a default so partial files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Path to the ONNX model file.
    pub model_path: PathBuf,
    /// Class names index-aligned with the model output; `None` keeps the defaults.
    pub class_names: Option<Vec<String>>,
    /// Address to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Number of ONNX Runtime sessions shared round-robin across requests.
    pub session_pool_size: usize,
    /// ONNX Runtime session options.
    pub ort_session: Option<OrtSessionConfig>,
    /// Upper bound for a request body, in bytes.
    pub max_upload_bytes: usize,
    /// Batches of at least this many images preprocess in parallel.
    pub parallel_threshold: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model.onnx"),
            class_names: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            session_pool_size: 1,
            ort_session: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ServiceConfig {
    /// Reads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Returns the socket address string `host:port`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ConfigValidator for ServiceConfig {
    /// Checks every value except the model path.
    ///
    /// A missing model file is not a configuration error: the service starts in
    /// degraded mode and reports `model_loaded: false`.
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_thread_count(self.session_pool_size)?;
        self.validate_positive_usize(self.max_upload_bytes, "max_upload_bytes")?;
        self.validate_positive_usize(self.parallel_threshold, "parallel_threshold")?;
        if let Some(names) = &self.class_names {
            if names.is_empty() {
                return Err(ConfigError::InvalidConfig {
                    message: "class_names must not be empty".to_string(),
                });
            }
        }
        if let Some(ort) = &self.ort_session {
            if let Some(intra) = ort.intra_threads {
                self.validate_thread_count(intra)?;
            }
            if let Some(inter) = ort.inter_threads {
                self.validate_thread_count(inter)?;
            }
        }
        Ok(())
    }
}
