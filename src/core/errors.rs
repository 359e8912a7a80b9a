//! Error types for the prediction pipeline.
//!
//! Every failure the pipeline can produce is a variant of [`VisionError`]. The
//! boundary layer maps the variants to HTTP statuses; the core never retries and
//! never swallows an error, so a failed TTA variant or batch item aborts the
//! whole ensemble.

use crate::core::model::ModelState;
use thiserror::Error;

/// Stage of preprocessing in which a [`VisionError::Preprocess`] occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Building or reshaping the input tensor.
    TensorOperation,
    /// Channel reordering and mean subtraction.
    Normalization,
    /// Geometric augmentation (rotation, re-encoding) for TTA.
    Augmentation,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::TensorOperation => write!(f, "tensor operation"),
            ProcessingStage::Normalization => write!(f, "normalization"),
            ProcessingStage::Augmentation => write!(f, "augmentation"),
        }
    }
}

/// Errors produced by the classification service.
#[derive(Error, Debug)]
pub enum VisionError {
    /// The model handle is not in the `Ready` state.
    #[error("model not available (state: {state})")]
    ModelUnavailable {
        /// Lifecycle state observed when the request was rejected.
        state: ModelState,
    },

    /// The model could not be loaded at startup.
    #[error("failed to load model from '{path}': {reason}")]
    ModelLoad {
        /// Path of the model file.
        path: std::path::PathBuf,
        /// Human-readable reason.
        reason: String,
        /// Runtime error, when one is available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The raw bytes could not be decoded as an image.
    #[error("image decode")]
    ImageDecode(#[source] image::ImageError),

    /// Preprocessing failed after a successful decode.
    #[error("{kind} failed: {context}")]
    Preprocess {
        /// The stage in which the failure happened.
        kind: ProcessingStage,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The forward pass failed or returned an unexpected shape.
    #[error("inference failed for model '{model_name}': {context}")]
    Inference {
        /// Name of the model that failed.
        model_name: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A probability vector does not match the catalog size.
    #[error("shape mismatch: expected {expected} classes, got {actual}")]
    ShapeMismatch {
        /// Number of classes in the catalog.
        expected: usize,
        /// Length of the offending vector.
        actual: usize,
    },

    /// Batch prediction was called without any image.
    #[error("batch prediction requires at least one image")]
    EmptyBatch,

    /// The request itself is malformed.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Configuration problem.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),
}

/// Convenient result alias for pipeline operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Plain message error used as a `source` when no richer error exists.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SimpleError(String);

impl SimpleError {
    /// Creates a new message error.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl VisionError {
    /// Creates a preprocessing error for tensor construction.
    pub fn tensor_operation(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_error(ProcessingStage::TensorOperation, context, error)
    }

    /// Creates a preprocessing error for the normalization stage.
    pub fn normalization(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_error(ProcessingStage::Normalization, context, error)
    }

    /// Creates a preprocessing error for the TTA augmentation stage.
    pub fn augmentation(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_error(ProcessingStage::Augmentation, context, error)
    }

    /// Creates a preprocessing error for an arbitrary stage.
    pub fn processing_error(
        kind: ProcessingStage,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Preprocess {
            kind,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an inference error with model context.
    pub fn inference_error(
        model_name: &str,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.to_string(),
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a model loading error.
    pub fn model_load_error(
        path: &std::path::Path,
        reason: &str,
        error: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        Self::ModelLoad {
            path: path.to_path_buf(),
            reason: reason.to_string(),
            source: error.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Creates an error for a malformed request.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true when the error means the model cannot serve requests yet.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ModelUnavailable { .. })
    }

    /// Renders the error together with its source chain on one line.
    pub fn detailed_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }
}

impl From<image::ImageError> for VisionError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageDecode(error)
    }
}

impl From<ndarray::ShapeError> for VisionError {
    fn from(error: ndarray::ShapeError) -> Self {
        Self::tensor_operation("tensor shape", error)
    }
}

impl From<serde_json::Error> for VisionError {
    fn from(error: serde_json::Error) -> Self {
        Self::Config {
            message: format!("invalid JSON: {error}"),
        }
    }
}

impl From<crate::core::config::ConfigError> for VisionError {
    fn from(error: crate::core::config::ConfigError) -> Self {
        Self::Config {
            message: error.to_string(),
        }
    }
}
