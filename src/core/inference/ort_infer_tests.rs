use super::*;
use crate::core::config::{OrtExecutionProvider, OrtSessionConfig};

#[test]
fn test_new_rejects_missing_model() {
    let result = OrtInfer::new("dummy_path.onnx", None);
    assert!(matches!(result, Err(VisionError::ModelLoad { .. })));
}

#[test]
fn test_with_pool_rejects_missing_model() {
    let config = OrtSessionConfig {
        intra_threads: Some(1),
        execution_providers: Some(vec![OrtExecutionProvider::CPU]),
        ..OrtSessionConfig::default()
    };
    let result = OrtInfer::with_pool("dummy_path.onnx", Some("input_1"), 3, Some(&config));
    let err = result.unwrap_err();
    assert!(err.to_string().contains("dummy_path.onnx"));
}

#[test]
fn test_with_pool_rejects_invalid_model_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.onnx");
    std::fs::write(&path, b"definitely not a protobuf").unwrap();
    let result = OrtInfer::with_pool(&path, None, 1, None);
    assert!(result.is_err());
}
