//! Single forward pass with shape checking.

use crate::core::errors::SimpleError;
use crate::core::{ModelHandle, Tensor4D, VisionError, VisionResult};
use crate::domain::ProbabilityVector;
use std::sync::Arc;
use tracing::debug;

/// Runs one preprocessed tensor through the shared model.
///
/// The runner never mutates the handle; any number of requests may call
/// [`InferenceRunner::infer`] concurrently.
#[derive(Debug, Clone)]
pub struct InferenceRunner {
    model: Arc<ModelHandle>,
    num_classes: usize,
}

impl InferenceRunner {
    /// Creates a runner expecting `(1, num_classes)` outputs.
    pub fn new(model: Arc<ModelHandle>, num_classes: usize) -> Self {
        Self { model, num_classes }
    }

    /// Number of classes each output row must contain.
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Runs inference on a `(1, H, W, 3)` tensor.
    ///
    /// # Errors
    ///
    /// * [`VisionError::ModelUnavailable`] when the handle is not ready; the
    ///   engine is not touched.
    /// * [`VisionError::Inference`] when the forward pass fails or the output
    ///   shape is not `(1, num_classes)`.
    pub fn infer(&self, tensor: &Tensor4D) -> VisionResult<ProbabilityVector> {
        let engine = self.model.engine()?;
        let output = engine.infer(tensor).map_err(|e| match e {
            VisionError::Inference { .. } => e,
            other => VisionError::inference_error(
                &engine.engine_info(),
                "forward pass failed",
                other,
            ),
        })?;

        let (rows, cols) = output.dim();
        if rows != 1 || cols != self.num_classes {
            return Err(VisionError::inference_error(
                &engine.engine_info(),
                "unexpected output shape",
                SimpleError::new(format!(
                    "expected (1, {}), got ({rows}, {cols})",
                    self.num_classes
                )),
            ));
        }
        debug!("Raw predictions: {:?}", output.row(0));
        Ok(ProbabilityVector::new(output.row(0).to_vec()))
    }
}
