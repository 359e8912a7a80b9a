//! Scripted engine and fixture images shared by unit tests.

use crate::core::{InferenceEngine, Tensor2D, Tensor4D, VisionError, VisionResult};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Engine that replays fixed output rows and records every call.
#[derive(Debug)]
pub(crate) struct ScriptedEngine {
    outputs: Vec<Vec<f32>>,
    fail_at: Option<usize>,
    calls: AtomicUsize,
    inputs: Mutex<Vec<Tensor4D>>,
}

impl ScriptedEngine {
    /// Returns `outputs[i % len]` on the i-th call.
    pub(crate) fn new(outputs: Vec<Vec<f32>>) -> Arc<Self> {
        Arc::new(Self {
            outputs,
            fail_at: None,
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        })
    }

    /// Fails every call from the `n`-th (zero based) onwards.
    pub(crate) fn failing_at(outputs: Vec<Vec<f32>>, n: usize) -> Arc<Self> {
        Arc::new(Self {
            outputs,
            fail_at: Some(n),
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn failing() -> Arc<Self> {
        Self::failing_at(vec![vec![0.0; 5]], 0)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn inputs(&self) -> Vec<Tensor4D> {
        self.inputs.lock().unwrap().clone()
    }
}

impl InferenceEngine for ScriptedEngine {
    fn infer(&self, input: &Tensor4D) -> VisionResult<Tensor2D> {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at.is_some_and(|n| idx >= n) {
            return Err(VisionError::invalid_input("scripted failure"));
        }
        self.inputs.lock().unwrap().push(input.clone());
        let row = self.outputs[idx % self.outputs.len()].clone();
        Ok(Tensor2D::from_shape_vec((1, row.len()), row)?)
    }

    fn engine_info(&self) -> String {
        "scripted".to_string()
    }
}

/// Encodes a patterned RGB image as PNG.
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 11 % 256) as u8, 90])
    });
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}
