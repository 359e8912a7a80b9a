//! Probability vectors and ranked prediction results.

use crate::core::{VisionError, VisionResult};
use serde::Serialize;

/// Per-class confidence values, index-aligned with the class catalog.
///
/// The values are whatever the model's final activation produced; they are
/// not required to sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityVector(Vec<f32>);

impl ProbabilityVector {
    /// Wraps raw per-class values.
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw values in class index order.
    pub fn values(&self) -> &[f32] {
        &self.0
    }

    /// Element-wise arithmetic mean of equally long vectors.
    ///
    /// Sums are accumulated in `f64` in slice order, then divided by the count.
    ///
    /// # Errors
    ///
    /// [`VisionError::EmptyBatch`] for an empty slice and
    /// [`VisionError::ShapeMismatch`] when lengths differ.
    pub fn mean(vectors: &[ProbabilityVector]) -> VisionResult<Self> {
        let first = vectors.first().ok_or(VisionError::EmptyBatch)?;
        let len = first.len();
        let mut sums = vec![0.0f64; len];
        for vector in vectors {
            if vector.len() != len {
                return Err(VisionError::ShapeMismatch {
                    expected: len,
                    actual: vector.len(),
                });
            }
            for (sum, &v) in sums.iter_mut().zip(vector.values()) {
                *sum += f64::from(v);
            }
        }
        let count = vectors.len() as f64;
        Ok(Self(sums.into_iter().map(|s| (s / count) as f32).collect()))
    }
}

impl From<Vec<f32>> for ProbabilityVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// One ranked class with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionEntry {
    /// Name from the class catalog.
    pub class_name: String,
    /// Index into the model output.
    pub class_index: usize,
    /// Raw model output for this class.
    pub confidence: f32,
}

/// Ranked predictions for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    /// All classes, sorted by confidence descending with ties in index order.
    pub predictions: Vec<PredictionEntry>,
    /// The first entry of `predictions`.
    pub top_prediction: PredictionEntry,
    /// Whether the vector came from an ensemble.
    #[serde(rename = "usedTTA")]
    pub used_tta: bool,
}

impl PredictionResult {
    /// The first `k` ranked entries.
    pub fn top_k(&self, k: usize) -> &[PredictionEntry] {
        &self.predictions[..k.min(self.predictions.len())]
    }

    /// One-line `name: confidence` summary of the first `k` entries.
    pub fn summary(&self, k: usize) -> String {
        self.top_k(k)
            .iter()
            .map(|p| format!("{}: {:.4}", p.class_name, p.confidence))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
