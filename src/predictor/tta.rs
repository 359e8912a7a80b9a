//! Test-time augmentation over four fixed variants.
//!
//! The variants are, in order:
//!
//! 1. the original image;
//! 2. the preprocessed tensor mirrored along its width axis;
//! 3. the decoded image rotated 5 degrees counter-clockwise, re-encoded as
//!    JPEG and preprocessed again from bytes;
//! 4. the same with a clockwise rotation.
//!
//! The flip acts on the normalized tensor while the rotations act on raw
//! pixels. Moving either transform to the other side changes the ensemble
//! output.

use crate::core::constants::{TTA_JPEG_QUALITY, TTA_ROTATION_DEGREES};
use crate::core::{Tensor4D, VisionResult};
use crate::domain::ProbabilityVector;
use crate::predictor::InferenceRunner;
use crate::processors::{ImagePreprocessor, decode_rgb, encode_jpeg, flip_width, rotate_ccw};
use image::RgbImage;
use tracing::{debug, info};

/// One of the fixed TTA transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtaVariant {
    Original,
    HorizontalFlip,
    RotateCcw,
    RotateCw,
}

impl TtaVariant {
    /// All variants in evaluation order.
    pub const ALL: [TtaVariant; 4] = [
        TtaVariant::Original,
        TtaVariant::HorizontalFlip,
        TtaVariant::RotateCcw,
        TtaVariant::RotateCw,
    ];

    /// Counter-clockwise rotation in degrees, for the rotation variants.
    pub fn rotation_degrees(self) -> Option<f32> {
        match self {
            TtaVariant::RotateCcw => Some(TTA_ROTATION_DEGREES),
            TtaVariant::RotateCw => Some(-TTA_ROTATION_DEGREES),
            TtaVariant::Original | TtaVariant::HorizontalFlip => None,
        }
    }
}

/// Averages predictions over [`TtaVariant::ALL`].
#[derive(Debug, Clone, Copy)]
pub struct TtaEnsembler<'a> {
    preprocessor: &'a ImagePreprocessor,
    runner: &'a InferenceRunner,
}

impl<'a> TtaEnsembler<'a> {
    pub fn new(preprocessor: &'a ImagePreprocessor, runner: &'a InferenceRunner) -> Self {
        Self {
            preprocessor,
            runner,
        }
    }

    /// Runs every variant through the model and returns the element-wise mean.
    ///
    /// The first failing variant aborts the call with its error.
    pub fn predict_with_tta(&self, bytes: &[u8]) -> VisionResult<ProbabilityVector> {
        let source = decode_rgb(bytes)?;
        let original = self.preprocessor.preprocess_rgb(&source)?;

        let mut predictions = Vec::with_capacity(TtaVariant::ALL.len());
        for variant in TtaVariant::ALL {
            let tensor = self.variant_tensor(variant, &source, &original)?;
            let prediction = self.runner.infer(&tensor)?;
            debug!("TTA variant {:?}: {:?}", variant, prediction.values());
            predictions.push(prediction);
        }

        let mean = ProbabilityVector::mean(&predictions)?;
        info!("TTA completed: {} augmentations", predictions.len());
        Ok(mean)
    }

    fn variant_tensor(
        &self,
        variant: TtaVariant,
        source: &RgbImage,
        original: &Tensor4D,
    ) -> VisionResult<Tensor4D> {
        match variant {
            TtaVariant::Original => Ok(original.clone()),
            TtaVariant::HorizontalFlip => {
                Ok(flip_width(original))
            }
            TtaVariant::RotateCcw | TtaVariant::RotateCw => {
                let degrees = variant.rotation_degrees().unwrap_or_default();
                let rotated = rotate_ccw(source, degrees);
                let jpeg = encode_jpeg(&rotated, TTA_JPEG_QUALITY)?;
                self.preprocessor.preprocess(&jpeg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InferenceEngine, ModelHandle, VisionError};
    use crate::domain::ClassCatalog;
    use crate::predictor::ResultRanker;
    use crate::predictor::test_support::{ScriptedEngine, png_bytes};
    use std::sync::Arc;

    fn one_hot_engine() -> Arc<ScriptedEngine> {
        ScriptedEngine::new(vec![
            vec![1.0, 0.0, 0.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 1.0, 0.0],
        ])
    }

    fn runner_for(engine: &Arc<ScriptedEngine>) -> InferenceRunner {
        let engine = Arc::clone(engine) as Arc<dyn InferenceEngine>;
        InferenceRunner::new(Arc::new(ModelHandle::with_engine(engine)), 5)
    }

    #[test]
    fn test_averages_four_variants() {
        let engine = one_hot_engine();
        let runner = runner_for(&engine);
        let pre = ImagePreprocessor::resnet50().unwrap();
        let tta = TtaEnsembler::new(&pre, &runner);

        let mean = tta.predict_with_tta(&png_bytes(40, 30)).unwrap();
        assert_eq!(engine.calls(), 4);
        assert_eq!(mean.values(), &[0.25, 0.25, 0.25, 0.25, 0.0]);

        let ranked = ResultRanker::rank(&mean, &ClassCatalog::sugarcane(), true).unwrap();
        let order: Vec<usize> = ranked.predictions.iter().map(|p| p.class_index).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        assert_eq!(ranked.top_prediction.class_name, "Healthy");
    }

    #[test]
    fn test_flip_variant_mirrors_preprocessed_tensor() {
        let engine = one_hot_engine();
        let runner = runner_for(&engine);
        let pre = ImagePreprocessor::resnet50().unwrap();
        TtaEnsembler::new(&pre, &runner)
            .predict_with_tta(&png_bytes(64, 48))
            .unwrap();

        let inputs = engine.inputs();
        assert_eq!(inputs.len(), 4);
        assert!(inputs.iter().all(|t| t.shape() == &[1, 224, 224, 3]));
        assert_eq!(inputs[1], flip_width(&inputs[0]));
        // Rotations go through a lossy re-encode and differ from the original.
        assert_ne!(inputs[2], inputs[0]);
        assert_ne!(inputs[3], inputs[0]);
        assert_ne!(inputs[2], inputs[3]);
    }

    #[test]
    fn test_variant_failure_aborts_ensemble() {
        let engine = ScriptedEngine::failing_at(vec![vec![0.2; 5]], 2);
        let runner = runner_for(&engine);
        let pre = ImagePreprocessor::resnet50().unwrap();
        let result = TtaEnsembler::new(&pre, &runner).predict_with_tta(&png_bytes(16, 16));
        assert!(matches!(result, Err(VisionError::Inference { .. })));
        assert_eq!(engine.calls(), 3);
    }

    #[test]
    fn test_undecodable_bytes_skip_inference() {
        let engine = one_hot_engine();
        let runner = runner_for(&engine);
        let pre = ImagePreprocessor::resnet50().unwrap();
        let result = TtaEnsembler::new(&pre, &runner).predict_with_tta(b"\x00\x01garbage");
        assert!(matches!(result, Err(VisionError::ImageDecode(_))));
        assert_eq!(engine.calls(), 0);
    }

    #[test]
    fn test_rotation_angles() {
        assert_eq!(TtaVariant::RotateCcw.rotation_degrees(), Some(5.0));
        assert_eq!(TtaVariant::RotateCw.rotation_degrees(), Some(-5.0));
        assert_eq!(TtaVariant::HorizontalFlip.rotation_degrees(), None);
    }
}
