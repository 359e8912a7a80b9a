use super::*;
use crate::core::errors::SimpleError;
use ndarray::ArrayView2;
use ort::value::TensorRef;

impl OrtInfer {
    /// Returns the model path associated with this inference engine.
    pub fn model_path(&self) -> &std::path::Path {
        &self.model_path
    }

    /// Returns the model name associated with this inference engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Runs the forward pass and returns a `(batch, classes)` matrix.
    pub fn infer_2d(&self, x: &Tensor4D) -> Result<Tensor2D, VisionError> {
        let input_shape = x.shape().to_vec();
        let output_name = &self.output_name;

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            VisionError::inference_error(
                &self.model_name,
                &format!("failed to convert input tensor with shape {:?}", input_shape),
                e,
            )
        })?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let idx = self
            .next_idx
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            % self.sessions.len();
        let mut session_guard = self.sessions[idx].lock().map_err(|_| {
            VisionError::inference_error(
                &self.model_name,
                &format!(
                    "failed to acquire session lock for session {}/{}",
                    idx,
                    self.sessions.len()
                ),
                SimpleError::new("session mutex poisoned"),
            )
        })?;

        let outputs = session_guard.run(inputs).map_err(|e| {
            VisionError::inference_error(
                &self.model_name,
                &format!(
                    "forward pass failed with input '{}' -> output '{}'",
                    self.input_name, output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                VisionError::inference_error(
                    &self.model_name,
                    &format!("failed to extract output tensor '{}' as f32", output_name),
                    e,
                )
            })?;

        if output_shape.len() != 2 {
            return Err(VisionError::inference_error(
                &self.model_name,
                &format!(
                    "expected 2D output tensor, got {}D with shape {:?}",
                    output_shape.len(),
                    output_shape
                ),
                SimpleError::new("invalid output tensor dimensions"),
            ));
        }

        let batch_size = output_shape[0] as usize;
        let num_classes = output_shape[1] as usize;
        let array_view = ArrayView2::from_shape((batch_size, num_classes), output_data)
            .map_err(|e| {
                VisionError::inference_error(
                    &self.model_name,
                    &format!(
                        "output data size mismatch for input shape {:?} -> output shape {:?}",
                        input_shape, output_shape
                    ),
                    e,
                )
            })?;
        Ok(array_view.to_owned())
    }
}
