//! Service context shared by every request.
//!
//! [`ClassifierService`] owns the model handle, the class catalog and the
//! preprocessing configuration. It is built once at startup, wrapped in an
//! `Arc`, and handed to the HTTP layer; nothing in it is mutated per request.

use crate::core::config::ServiceConfig;
use crate::core::constants::{API_VERSION, DEFAULT_PARALLEL_THRESHOLD};
use crate::core::{InferenceEngine, ModelHandle, ModelState, OrtInfer, VisionResult};
use crate::domain::{ClassCatalog, PredictionResult};
use crate::predictor::{BatchEnsembler, InferenceRunner, ResultRanker, TtaEnsembler};
use crate::processors::ImagePreprocessor;
use std::sync::Arc;
use tracing::{info, warn};

/// Model, catalog and preprocessing bundled for the request handlers.
#[derive(Debug)]
pub struct ClassifierService {
    model: Arc<ModelHandle>,
    catalog: ClassCatalog,
    preprocessor: ImagePreprocessor,
    runner: InferenceRunner,
    parallel_threshold: usize,
}

impl ClassifierService {
    /// Creates a service around an existing model handle.
    pub fn new(model: Arc<ModelHandle>, catalog: ClassCatalog) -> VisionResult<Self> {
        let runner = InferenceRunner::new(Arc::clone(&model), catalog.len());
        Ok(Self {
            model,
            catalog,
            preprocessor: ImagePreprocessor::resnet50()?,
            runner,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        })
    }

    /// Creates a service with an unloaded model from configuration.
    pub fn from_config(config: &ServiceConfig) -> VisionResult<Self> {
        let catalog = match &config.class_names {
            Some(names) => ClassCatalog::new(names.iter().cloned())?,
            None => ClassCatalog::sugarcane(),
        };
        Ok(Self::new(Arc::new(ModelHandle::new()), catalog)?
            .with_parallel_threshold(config.parallel_threshold))
    }

    /// Sets the batch size from which batch preprocessing runs in parallel.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold.max(1);
        self
    }

    /// Loads the ONNX model described by `config` into the shared handle.
    ///
    /// Runs at most once; a failure leaves the handle in `LoadFailed` and the
    /// service keeps answering metadata requests.
    pub fn load_model(&self, config: &ServiceConfig) -> VisionResult<()> {
        info!("Loading model from {}", config.model_path.display());
        self.model.load_with(|| {
            let engine = OrtInfer::with_pool(
                &config.model_path,
                None,
                config.session_pool_size,
                config.ort_session.as_ref(),
            )?;
            info!(
                "Model '{}' loaded from {} with {} session(s)",
                engine.model_name(),
                engine.model_path().display(),
                engine.pool_size()
            );
            match engine.primary_input_shape() {
                Some(shape) => info!("Model input shape: {:?}", shape),
                None => warn!("Model input shape could not be determined"),
            }
            if let Some(shape) = engine.primary_output_shape() {
                info!("Model output shape: {:?}", shape);
            }
            Ok(Arc::new(engine) as Arc<dyn InferenceEngine>)
        })
    }

    /// True once the model is ready for inference.
    pub fn model_loaded(&self) -> bool {
        self.model.is_ready()
    }

    /// Current model lifecycle state.
    pub fn model_state(&self) -> ModelState {
        self.model.state()
    }

    pub fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    /// Side length of the square model input.
    pub fn input_size(&self) -> u32 {
        self.preprocessor.input_size()
    }

    /// API version reported to clients.
    pub fn version(&self) -> &'static str {
        API_VERSION
    }

    /// Classifies one image, optionally with test-time augmentation.
    ///
    /// Readiness is checked before the bytes are decoded, so an unavailable
    /// model never costs any preprocessing.
    pub fn predict(&self, bytes: &[u8], use_tta: bool) -> VisionResult<PredictionResult> {
        self.model.engine()?;
        info!("Image received: {} bytes", bytes.len());
        info!("TTA: {}", if use_tta { "enabled" } else { "disabled" });

        let vector = if use_tta {
            info!("Applying TTA...");
            TtaEnsembler::new(&self.preprocessor, &self.runner).predict_with_tta(bytes)?
        } else {
            let tensor = self.preprocessor.preprocess(bytes)?;
            self.runner.infer(&tensor)?
        };

        let result = ResultRanker::rank(&vector, &self.catalog, use_tta)?;
        info!(
            "Top prediction: {} ({:.2}%)",
            result.top_prediction.class_name,
            result.top_prediction.confidence * 100.0
        );
        info!("Top 3: {}", result.summary(3));
        Ok(result)
    }

    /// Averages predictions over several images of the same subject.
    pub fn predict_batch<B: AsRef<[u8]> + Sync>(
        &self,
        images: &[B],
    ) -> VisionResult<PredictionResult> {
        self.model.engine()?;
        info!("Batch received: {} images", images.len());

        let vector = BatchEnsembler::new(&self.preprocessor, &self.runner)
            .with_parallel_threshold(self.parallel_threshold)
            .predict_batch(images)?;
        let result = ResultRanker::rank(&vector, &self.catalog, true)?;
        info!("Top 3: {}", result.summary(3));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::VisionError;
    use crate::predictor::test_support::{ScriptedEngine, png_bytes};

    fn ready_service(engine: &Arc<ScriptedEngine>) -> ClassifierService {
        let engine = Arc::clone(engine) as Arc<dyn InferenceEngine>;
        ClassifierService::new(
            Arc::new(ModelHandle::with_engine(engine)),
            ClassCatalog::sugarcane(),
        )
        .unwrap()
    }

    #[test]
    fn test_predict_without_tta() {
        let engine = ScriptedEngine::new(vec![vec![0.1, 0.2, 0.3, 0.25, 0.15]]);
        let service = ready_service(&engine);
        let result = service.predict(&png_bytes(32, 32), false).unwrap();

        assert_eq!(engine.calls(), 1);
        assert!(!result.used_tta);
        assert_eq!(result.top_prediction.class_name, "RedRot");
        assert_eq!(result.predictions.len(), 5);
    }

    #[test]
    fn test_predict_with_tta_runs_four_passes() {
        let engine = ScriptedEngine::new(vec![vec![0.2; 5]]);
        let service = ready_service(&engine);
        let result = service.predict(&png_bytes(32, 32), true).unwrap();
        assert_eq!(engine.calls(), 4);
        assert!(result.used_tta);
    }

    #[test]
    fn test_unloaded_model_rejects_before_decoding() {
        let service = ClassifierService::from_config(&ServiceConfig::default()).unwrap();
        assert!(!service.model_loaded());
        assert_eq!(service.model_state(), ModelState::Unloaded);

        // Undecodable bytes still report unavailability, not a decode error.
        let err = service.predict(b"not an image", false).unwrap_err();
        assert!(err.is_unavailable());
        let err = service.predict_batch(&[b"x".to_vec()]).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_failed_load_is_degraded_mode() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig {
            model_path: dir.path().join("missing.onnx"),
            ..ServiceConfig::default()
        };
        let service = ClassifierService::from_config(&config).unwrap();
        assert!(matches!(
            service.load_model(&config),
            Err(VisionError::ModelLoad { .. })
        ));
        assert_eq!(service.model_state(), ModelState::LoadFailed);
        assert_eq!(service.catalog().len(), 5);
        assert!(service.predict(&png_bytes(8, 8), false).unwrap_err().is_unavailable());
    }

    #[test]
    fn test_batch_uses_tta_flag() {
        let engine = ScriptedEngine::new(vec![
            vec![0.3, 0.0, 0.0, 0.0, 0.7],
            vec![0.0, 0.3, 0.0, 0.3, 0.4],
            vec![0.0, 0.0, 0.3, 0.3, 0.4],
        ]);
        let service = ready_service(&engine).with_parallel_threshold(2);
        let images = vec![png_bytes(10, 10), png_bytes(12, 12), png_bytes(14, 14)];
        let result = service.predict_batch(&images).unwrap();
        assert!(result.used_tta);
        assert_eq!(result.top_prediction.class_name, "Yellow");
        assert!((result.top_prediction.confidence - 0.5).abs() < 1e-6);

        let empty: Vec<Vec<u8>> = Vec::new();
        assert!(matches!(
            service.predict_batch(&empty),
            Err(VisionError::EmptyBatch)
        ));
    }

    #[test]
    fn test_custom_class_names() {
        let config = ServiceConfig {
            class_names: Some(vec!["a".to_string(), "b".to_string()]),
            ..ServiceConfig::default()
        };
        let service = ClassifierService::from_config(&config).unwrap();
        assert_eq!(service.catalog().names(), &["a", "b"]);
        assert_eq!(service.input_size(), 224);
        assert_eq!(service.version(), "1.0.0");
    }
}
