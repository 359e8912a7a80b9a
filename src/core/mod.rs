//! The core module of the classification service.
//!
//! This module contains the fundamental components shared by the pipeline:
//! - Configuration management
//! - Constants used throughout the service
//! - Error handling
//! - ONNX Runtime integration
//! - The model handle lifecycle
//! - Traits defining the inference seam

pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;
pub mod model;
pub mod traits;

pub use config::{ConfigError, ConfigValidator, OrtSessionConfig, ServiceConfig};
pub use constants::*;
pub use errors::{ProcessingStage, SimpleError, VisionError, VisionResult};
pub use inference::OrtInfer;
pub use model::{ModelHandle, ModelState};
pub use traits::InferenceEngine;

/// A 2-dimensional tensor represented as a 2D array of f32 values.
pub type Tensor2D = ndarray::Array2<f32>;

/// A 4-dimensional tensor represented as a 4D array of f32 values.
pub type Tensor4D = ndarray::Array4<f32>;

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and formatting layer.
/// `RUST_LOG` takes precedence; without it the service logs at `info`.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
