//! ONNX Runtime options read from the `ort_session` section of the service
//! configuration.

use serde::{Deserialize, Serialize};

/// How aggressively ONNX Runtime rewrites the model graph at load time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrtGraphOptimizationLevel {
    /// No graph rewrites.
    Disabled,
    /// Constant folding and redundant node elimination.
    #[default]
    Basic,
    /// Adds node fusions.
    Extended,
    /// Everything, including layout transforms.
    All,
}

/// Where sessions execute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum OrtExecutionProvider {
    /// CPU execution provider (always available)
    #[default]
    CPU,
    /// NVIDIA CUDA execution provider
    CUDA {
        /// CUDA device ID (default: 0)
        device_id: Option<i32>,
    },
}

/// Per-session ONNX Runtime settings. Unset fields keep the runtime default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrtSessionConfig {
    /// Threads used within a single operator
    pub intra_threads: Option<usize>,
    /// Threads used across independent operators
    pub inter_threads: Option<usize>,
    /// Graph optimization level
    pub optimization_level: Option<OrtGraphOptimizationLevel>,
    /// Execution providers in order of preference
    pub execution_providers: Option<Vec<OrtExecutionProvider>>,
}

impl OrtSessionConfig {
    /// Execution providers to register, CPU when none are configured.
    pub fn get_execution_providers(&self) -> Vec<OrtExecutionProvider> {
        self.execution_providers
            .clone()
            .unwrap_or_else(|| vec![OrtExecutionProvider::CPU])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(OrtExecutionProvider::default(), OrtExecutionProvider::CPU);
        assert_eq!(
            OrtGraphOptimizationLevel::default(),
            OrtGraphOptimizationLevel::Basic
        );
        assert_eq!(
            OrtSessionConfig::default().get_execution_providers(),
            vec![OrtExecutionProvider::CPU]
        );
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: OrtSessionConfig =
            serde_json::from_str(r#"{"intra_threads": 2, "optimization_level": "extended"}"#)
                .unwrap();
        assert_eq!(config.intra_threads, Some(2));
        assert_eq!(config.inter_threads, None);
        assert_eq!(
            config.optimization_level,
            Some(OrtGraphOptimizationLevel::Extended)
        );
        assert!(config.execution_providers.is_none());
    }

    #[test]
    fn test_deserialize_cuda_provider() {
        let config: OrtSessionConfig = serde_json::from_str(
            r#"{"execution_providers": [{"CUDA": {"device_id": 1}}, "CPU"]}"#,
        )
        .unwrap();
        assert_eq!(
            config.get_execution_providers(),
            vec![
                OrtExecutionProvider::CUDA { device_id: Some(1) },
                OrtExecutionProvider::CPU
            ]
        );
    }
}
