//! Seams between the pipeline and its external collaborators.

use crate::core::errors::VisionResult;
use crate::core::{Tensor2D, Tensor4D};
use std::fmt::Debug;

/// Trait for inference engine operations.
///
/// The pipeline only depends on this contract: a `(1, H, W, 3)` tensor goes in,
/// a `(batch, classes)` score matrix comes out. ONNX Runtime implements it in
/// [`crate::core::inference::OrtInfer`]; tests substitute scripted engines.
pub trait InferenceEngine: Send + Sync + Debug {
    /// Perform inference on a preprocessed input tensor.
    fn infer(&self, input: &Tensor4D) -> VisionResult<Tensor2D>;

    /// String describing the inference engine (model name, backend).
    fn engine_info(&self) -> String;
}
