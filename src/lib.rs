//! # SaccharumVision
//!
//! Sugarcane leaf disease classification served over HTTP, backed by a
//! ResNet50 model running on ONNX Runtime.
//!
//! ## Features
//!
//! - Preprocessing that reproduces the caffe-style normalization the model was
//!   trained with (BGR order, ImageNet means subtracted, no scaling)
//! - Test-time augmentation over four fixed variants
//! - Batch ensembling over caller-supplied images
//! - Stable ranking with ties kept in class index order
//! - Degraded mode when the model fails to load
//!
//! ## Modules
//!
//! * [`core`] - Errors, configuration, the model handle and ONNX Runtime integration
//! * [`domain`] - Class catalog and prediction types
//! * [`processors`] - Image decoding, normalization and augmentation
//! * [`predictor`] - Inference, TTA, batch ensembling and ranking
//! * [`service`] - The request-independent service context
//! * [`api`] - The axum router
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use saccharum_vision::prelude::*;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig {
//!     model_path: "models/sugarcane_resnet50.onnx".into(),
//!     ..ServiceConfig::default()
//! };
//! let service = ClassifierService::from_config(&config)?;
//! service.load_model(&config)?;
//!
//! let bytes = std::fs::read("leaf.jpg")?;
//! let result = service.predict(&bytes, true)?;
//! println!(
//!     "{} ({:.2}%)",
//!     result.top_prediction.class_name,
//!     result.top_prediction.confidence * 100.0
//! );
//!
//! let _router = create_router(AppState::new(Arc::new(service)));
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod core;
pub mod domain;
pub mod predictor;
pub mod processors;
pub mod service;

/// Prelude module for convenient imports.
///
/// ```rust
/// use saccharum_vision::prelude::*;
/// ```
pub mod prelude {
    // Service and HTTP boundary
    pub use crate::api::{AppState, create_router};
    pub use crate::service::ClassifierService;

    // Configuration
    pub use crate::core::{ConfigValidator, ServiceConfig};

    // Results
    pub use crate::domain::{ClassCatalog, PredictionEntry, PredictionResult};

    // Error Handling
    pub use crate::core::{VisionError, VisionResult};
}
