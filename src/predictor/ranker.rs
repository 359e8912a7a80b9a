//! Turns a probability vector into ranked, named predictions.

use crate::core::{VisionError, VisionResult};
use crate::domain::{ClassCatalog, PredictionEntry, PredictionResult, ProbabilityVector};

/// Sorts class confidences and attaches catalog names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultRanker;

impl ResultRanker {
    /// Ranks `vector` against `catalog`.
    ///
    /// Entries are sorted by confidence, highest first. The sort is stable over
    /// index-ordered input, so exactly equal confidences keep ascending class
    /// index order. NaN confidences sort after every number.
    ///
    /// # Errors
    ///
    /// [`VisionError::ShapeMismatch`] when the vector length differs from the
    /// catalog size.
    pub fn rank(
        vector: &ProbabilityVector,
        catalog: &ClassCatalog,
        used_tta: bool,
    ) -> VisionResult<PredictionResult> {
        if vector.len() != catalog.len() {
            return Err(VisionError::ShapeMismatch {
                expected: catalog.len(),
                actual: vector.len(),
            });
        }

        let mut predictions: Vec<PredictionEntry> = catalog
            .iter()
            .zip(vector.values())
            .map(|((class_index, name), &confidence)| PredictionEntry {
                class_name: name.to_string(),
                class_index,
                confidence,
            })
            .collect();
        predictions.sort_by(|a, b| match (a.confidence.is_nan(), b.confidence.is_nan()) {
            (false, false) => b.confidence.total_cmp(&a.confidence),
            (a_nan, b_nan) => a_nan.cmp(&b_nan),
        });

        let top_prediction = predictions[0].clone();
        Ok(PredictionResult {
            predictions,
            top_prediction,
            used_tta,
        })
    }
}
