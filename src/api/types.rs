//! Request and response bodies for the HTTP API.

use crate::domain::PredictionResult;
use serde::{Deserialize, Deserializer, Serialize, de};

/// `GET /` response
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    /// Always "online"
    pub status: String,
    /// Service name
    pub message: String,
    /// Whether the model reached the ready state
    pub model_loaded: bool,
    /// API version
    pub version: String,
}

/// `GET /health` response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy"
    pub status: String,
    /// Whether the model reached the ready state
    pub model_loaded: bool,
    /// Class names in index order
    pub classes: Vec<String>,
}

/// Query parameters of `POST /predict`
#[derive(Debug, Default, Deserialize)]
pub struct PredictParams {
    /// Run test-time augmentation
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub use_tta: bool,
}

/// Accepts the boolean spellings clients send: `true`/`false`,
/// `1`/`0`, `yes`/`no`, `on`/`off`, `t`/`f` and `y`/`n`, in any case.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Ok(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Ok(false),
        other => Err(de::Error::custom(format!("invalid boolean value '{other}'"))),
    }
}

/// Model metadata echoed with single-image predictions
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub version: String,
    pub input_size: u32,
}

/// `POST /predict` response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: PredictionResult,
    pub model_info: ModelInfo,
}

/// `POST /predict-batch` response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPredictResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: PredictionResult,
    pub num_images: usize,
}

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub detail: String,
}
