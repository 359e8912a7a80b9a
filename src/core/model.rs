//! Lifecycle of the shared model handle.
//!
//! The handle moves `Unloaded -> Loading -> Ready` or `Loading -> LoadFailed`
//! exactly once per process. The transition is guarded by an atomic state flag
//! so that concurrent load attempts cannot race, and the loaded engine is
//! published through a one-shot cell before the state flips to `Ready`.

use crate::core::errors::{VisionError, VisionResult};
use crate::core::traits::InferenceEngine;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::{error, info};

/// Lifecycle state of a [`ModelHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// No load has been attempted.
    Unloaded,
    /// A load is in progress.
    Loading,
    /// The engine is available for inference.
    Ready,
    /// Loading failed; the service stays up in degraded mode.
    LoadFailed,
}

impl ModelState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ModelState::Unloaded,
            1 => ModelState::Loading,
            2 => ModelState::Ready,
            _ => ModelState::LoadFailed,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ModelState::Unloaded => 0,
            ModelState::Loading => 1,
            ModelState::Ready => 2,
            ModelState::LoadFailed => 3,
        }
    }
}

impl std::fmt::Display for ModelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelState::Unloaded => write!(f, "unloaded"),
            ModelState::Loading => write!(f, "loading"),
            ModelState::Ready => write!(f, "ready"),
            ModelState::LoadFailed => write!(f, "load failed"),
        }
    }
}

/// Process-wide, read-only handle to the loaded inference engine.
pub struct ModelHandle {
    state: AtomicU8,
    engine: OnceCell<Arc<dyn InferenceEngine>>,
    failure: OnceCell<String>,
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("state", &self.state())
            .field("engine", &self.engine.get().map(|e| e.engine_info()))
            .field("failure", &self.failure.get())
            .finish()
    }
}

impl Default for ModelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelHandle {
    /// Creates an unloaded handle.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ModelState::Unloaded.as_u8()),
            engine: OnceCell::new(),
            failure: OnceCell::new(),
        }
    }

    /// Creates a handle that is already `Ready` with the given engine.
    pub fn with_engine(engine: Arc<dyn InferenceEngine>) -> Self {
        let handle = Self::new();
        // A fresh cell cannot be occupied.
        let _ = handle.engine.set(engine);
        handle
            .state
            .store(ModelState::Ready.as_u8(), Ordering::Release);
        handle
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> ModelState {
        ModelState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Returns true when inference can run.
    pub fn is_ready(&self) -> bool {
        self.state() == ModelState::Ready
    }

    /// Returns the recorded load failure, if loading failed.
    pub fn failure(&self) -> Option<&str> {
        self.failure.get().map(String::as_str)
    }

    /// Marks the handle as `Loading`.
    ///
    /// Only the first caller wins; any later call (including while a load is in
    /// flight) gets a configuration error and must not run a loader.
    pub fn begin_loading(&self) -> VisionResult<()> {
        self.state
            .compare_exchange(
                ModelState::Unloaded.as_u8(),
                ModelState::Loading.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(|current| {
                VisionError::config_error(format!(
                    "model load already attempted (state: {})",
                    ModelState::from_u8(current)
                ))
            })
    }

    /// Finishes a load started with [`ModelHandle::begin_loading`].
    pub fn complete_loading(
        &self,
        outcome: VisionResult<Arc<dyn InferenceEngine>>,
    ) -> VisionResult<()> {
        if self.state() != ModelState::Loading {
            return Err(VisionError::config_error(format!(
                "cannot complete load from state {}",
                self.state()
            )));
        }
        match outcome {
            Ok(engine) => {
                info!("Model ready: {}", engine.engine_info());
                let _ = self.engine.set(engine);
                self.state
                    .store(ModelState::Ready.as_u8(), Ordering::Release);
                Ok(())
            }
            Err(err) => {
                error!("Model load failed: {}", err.detailed_message());
                let _ = self.failure.set(err.detailed_message());
                self.state
                    .store(ModelState::LoadFailed.as_u8(), Ordering::Release);
                Err(err)
            }
        }
    }

    /// Runs `loader` at most once and records the resulting state.
    pub fn load_with<F>(&self, loader: F) -> VisionResult<()>
    where
        F: FnOnce() -> VisionResult<Arc<dyn InferenceEngine>>,
    {
        self.begin_loading()?;
        self.complete_loading(loader())
    }

    /// Returns the engine, failing fast unless the handle is `Ready`.
    pub fn engine(&self) -> VisionResult<&Arc<dyn InferenceEngine>> {
        let state = self.state();
        if state != ModelState::Ready {
            return Err(VisionError::ModelUnavailable { state });
        }
        self.engine
            .get()
            .ok_or(VisionError::ModelUnavailable { state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Tensor2D;
    use crate::core::Tensor4D;

    #[derive(Debug)]
    struct NullEngine;

    impl InferenceEngine for NullEngine {
        fn infer(&self, _input: &Tensor4D) -> VisionResult<Tensor2D> {
            Ok(Tensor2D::zeros((1, 5)))
        }

        fn engine_info(&self) -> String {
            "null".to_string()
        }
    }

    #[test]
    fn test_new_handle_is_unloaded() {
        let handle = ModelHandle::new();
        assert_eq!(handle.state(), ModelState::Unloaded);
        assert!(!handle.is_ready());
        assert!(matches!(
            handle.engine(),
            Err(VisionError::ModelUnavailable {
                state: ModelState::Unloaded
            })
        ));
    }

    #[test]
    fn test_successful_load_transitions_to_ready() {
        let handle = ModelHandle::new();
        handle
            .load_with(|| Ok(Arc::new(NullEngine) as Arc<dyn InferenceEngine>))
            .unwrap();
        assert_eq!(handle.state(), ModelState::Ready);
        assert_eq!(handle.engine().unwrap().engine_info(), "null");
    }

    #[test]
    fn test_failed_load_is_terminal() {
        let handle = ModelHandle::new();
        let result = handle.load_with(|| Err(VisionError::config_error("missing file")));
        assert!(result.is_err());
        assert_eq!(handle.state(), ModelState::LoadFailed);
        assert!(handle.failure().unwrap().contains("missing file"));

        // A second attempt must not run its loader.
        let mut called = false;
        let retry = handle.load_with(|| {
            called = true;
            Ok(Arc::new(NullEngine) as Arc<dyn InferenceEngine>)
        });
        assert!(retry.is_err());
        assert!(!called);
        assert_eq!(handle.state(), ModelState::LoadFailed);
    }

    #[test]
    fn test_loading_state_fails_fast() {
        let handle = ModelHandle::new();
        handle.begin_loading().unwrap();
        assert!(matches!(
            handle.engine(),
            Err(VisionError::ModelUnavailable {
                state: ModelState::Loading
            })
        ));
        assert!(handle.begin_loading().is_err());
    }

    #[test]
    fn test_concurrent_loads_run_once() {
        use std::sync::atomic::AtomicUsize;

        let handle = Arc::new(ModelHandle::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let handle = Arc::clone(&handle);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    let _ = handle.load_with(|| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(Arc::new(NullEngine) as Arc<dyn InferenceEngine>)
                    });
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(handle.is_ready());
    }
}
