//! Endpoint handlers.
//!
//! Pipeline work is CPU bound and runs on the blocking pool. Readiness is
//! checked before the request body is read.

use super::AppState;
use super::types::{
    BatchPredictResponse, ErrorResponse, HealthResponse, ModelInfo, PredictParams,
    PredictResponse, RootResponse,
};
use crate::core::VisionError;
use crate::core::constants::SERVICE_NAME;
use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info};

/// Error returned by handlers, rendered as `{detail}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// Maps a pipeline error; `what` names the payload in the 500 message.
    fn from_vision(err: VisionError, what: &str) -> Self {
        if err.is_unavailable() {
            return Self::new(StatusCode::SERVICE_UNAVAILABLE, "Model not available");
        }
        match err {
            VisionError::InvalidInput { message } => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
            }
            other => {
                let detail = other.detailed_message();
                error!("Prediction error: {}", detail);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error processing {what}: {detail}"),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}

fn ensure_ready(state: &AppState) -> Result<(), ApiError> {
    if state.service.model_loaded() {
        Ok(())
    } else {
        Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Model not available",
        ))
    }
}

/// Collects the bytes of every multipart field called `name`, in order.
async fn read_files(multipart: &mut Multipart, name: &str) -> Result<Vec<Vec<u8>>, ApiError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::from_vision(
            VisionError::invalid_input(format!("malformed multipart body: {e}")),
            "request",
        )
    })? {
        if field.name() != Some(name) {
            continue;
        }
        let filename = field.file_name().unwrap_or("<unnamed>").to_string();
        let bytes = field.bytes().await.map_err(|e| {
            ApiError::from_vision(
                VisionError::invalid_input(format!("failed to read '{filename}': {e}")),
                "request",
            )
        })?;
        info!("File received: {}, {} bytes", filename, bytes.len());
        files.push(bytes.to_vec());
    }
    Ok(files)
}

/// Service banner (`GET /`)
pub(crate) async fn root_handler(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        status: "online".to_string(),
        message: SERVICE_NAME.to_string(),
        model_loaded: state.service.model_loaded(),
        version: state.service.version().to_string(),
    })
}

/// Health check (`GET /health`)
pub(crate) async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: state.service.model_loaded(),
        classes: state.service.catalog().names().to_vec(),
    })
}

/// Single image prediction (`POST /predict?use_tta=bool`)
pub(crate) async fn predict_handler(
    State(state): State<AppState>,
    Query(params): Query<PredictParams>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    ensure_ready(&state)?;

    let bytes = read_files(&mut multipart, "file")
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            ApiError::from_vision(
                VisionError::invalid_input("missing multipart field 'file'"),
                "request",
            )
        })?;

    let service = state.service.clone();
    let use_tta = params.use_tta;
    let result = tokio::task::spawn_blocking(move || service.predict(&bytes, use_tta))
        .await
        .map_err(|e| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Prediction task failed: {e}"),
            )
        })?
        .map_err(|e| ApiError::from_vision(e, "image"))?;

    Ok(Json(PredictResponse {
        success: true,
        result,
        model_info: ModelInfo {
            version: state.service.version().to_string(),
            input_size: state.service.input_size(),
        },
    }))
}

/// Averaged prediction over several images (`POST /predict-batch`)
pub(crate) async fn predict_batch_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BatchPredictResponse>, ApiError> {
    ensure_ready(&state)?;

    let files = read_files(&mut multipart, "files").await?;
    if files.is_empty() {
        return Err(ApiError::from_vision(VisionError::EmptyBatch, "images"));
    }
    let num_images = files.len();

    let service = state.service.clone();
    let result = tokio::task::spawn_blocking(move || service.predict_batch(&files))
        .await
        .map_err(|e| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Batch prediction task failed: {e}"),
            )
        })?
        .map_err(|e| ApiError::from_vision(e, "images"))?;

    Ok(Json(BatchPredictResponse {
        success: true,
        result,
        num_images,
    }))
}
