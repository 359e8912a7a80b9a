//! ONNX Runtime integration.
//!
//! This module holds the low level inference engine that implements the
//! [`InferenceEngine`](crate::core::traits::InferenceEngine) contract for the
//! exported classifier.

pub mod ort_infer;

pub use ort_infer::OrtInfer;
