//! HTTP API for the classifier.
//!
//! Endpoints:
//! - `GET /` - service banner
//! - `GET /health` - health check with the class list
//! - `POST /predict` - single image, optional `use_tta` query flag
//! - `POST /predict-batch` - several images averaged into one prediction

mod handlers;
pub mod types;

pub use handlers::ApiError;
pub use types::*;

use crate::core::constants::DEFAULT_MAX_UPLOAD_BYTES;
use crate::service::ClassifierService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use handlers::{health_handler, predict_batch_handler, predict_handler, root_handler};
use std::sync::Arc;

/// Shared state for the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    service: Arc<ClassifierService>,
    max_upload_bytes: usize,
}

impl AppState {
    /// Wraps a service with the default upload limit.
    pub fn new(service: Arc<ClassifierService>) -> Self {
        Self {
            service,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Sets the maximum accepted request body size.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/predict", post(predict_handler))
        .route("/predict-batch", post(predict_batch_handler))
        .layer(body_limit)
        .with_state(state)
}
