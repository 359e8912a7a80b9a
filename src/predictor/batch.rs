//! Averaging over caller-supplied images.

use crate::core::constants::DEFAULT_PARALLEL_THRESHOLD;
use crate::core::{Tensor4D, VisionError, VisionResult};
use crate::domain::ProbabilityVector;
use crate::predictor::InferenceRunner;
use crate::processors::ImagePreprocessor;
use rayon::prelude::*;
use tracing::debug;

/// Predicts each image independently and averages the vectors.
///
/// No augmentation is applied. Preprocessing fans out over rayon once the
/// batch reaches `parallel_threshold`; inference and the mean always run in
/// input order.
#[derive(Debug, Clone, Copy)]
pub struct BatchEnsembler<'a> {
    preprocessor: &'a ImagePreprocessor,
    runner: &'a InferenceRunner,
    parallel_threshold: usize,
}

impl<'a> BatchEnsembler<'a> {
    pub fn new(preprocessor: &'a ImagePreprocessor, runner: &'a InferenceRunner) -> Self {
        Self {
            preprocessor,
            runner,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Sets the batch size from which preprocessing runs in parallel.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold.max(1);
        self
    }

    /// Returns the element-wise mean prediction over `images`.
    ///
    /// # Errors
    ///
    /// [`VisionError::EmptyBatch`] before any decode or inference when
    /// `images` is empty. Any per-image failure aborts the whole batch.
    pub fn predict_batch<B: AsRef<[u8]> + Sync>(
        &self,
        images: &[B],
    ) -> VisionResult<ProbabilityVector> {
        if images.is_empty() {
            return Err(VisionError::EmptyBatch);
        }

        let tensors = self.preprocess_all(images)?;
        let predictions = tensors
            .iter()
            .map(|tensor| self.runner.infer(tensor))
            .collect::<VisionResult<Vec<_>>>()?;
        debug!("Batch of {} images inferred", predictions.len());
        ProbabilityVector::mean(&predictions)
    }

    fn preprocess_all<B: AsRef<[u8]> + Sync>(&self, images: &[B]) -> VisionResult<Vec<Tensor4D>> {
        if images.len() >= self.parallel_threshold {
            images
                .par_iter()
                .map(|bytes| self.preprocessor.preprocess(bytes.as_ref()))
                .collect()
        } else {
            images
                .iter()
                .map(|bytes| self.preprocessor.preprocess(bytes.as_ref()))
                .collect()
        }
    }
}
