//! Image normalization.
//!
//! Converts 8-bit RGB images into `(1, H, W, 3)` floating point tensors in
//! BGR channel order with per-channel scaling and mean/std normalization.

use crate::core::constants::CAFFE_MEAN_RGB;
use crate::core::{Tensor4D, VisionError, VisionResult};
use image::RgbImage;

/// Normalizes images into model input tensors.
///
/// Each output value is `pixel * alpha[c] + beta[c]` where `c` is the source
/// RGB channel, so `alpha = scale / std` and `beta = -mean / std`. With unit
/// scale and std this is exactly `pixel - mean`. Output channel 0 is blue.
#[derive(Debug, Clone)]
pub struct NormalizeImage {
    /// Scaling factors for each source channel (alpha = scale / std)
    pub alpha: [f32; 3],
    /// Offset values for each source channel (beta = -mean / std)
    pub beta: [f32; 3],
}

impl NormalizeImage {
    /// Creates a new NormalizeImage instance.
    ///
    /// `mean` and `std` are given in RGB order.
    ///
    /// # Errors
    ///
    /// Returns an error if the scale or any standard deviation is not positive,
    /// or if a derived coefficient is not finite.
    pub fn new(scale: f32, mean: [f32; 3], std: [f32; 3]) -> VisionResult<Self> {
        if scale <= 0.0 {
            return Err(VisionError::config_error("Scale must be greater than 0"));
        }
        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(VisionError::config_error(format!(
                    "Standard deviation at index {i} must be greater than 0, got {s}"
                )));
            }
        }

        let alpha = [scale / std[0], scale / std[1], scale / std[2]];
        let beta = [-mean[0] / std[0], -mean[1] / std[1], -mean[2] / std[2]];
        let normalizer = Self { alpha, beta };
        normalizer.validate_config()?;
        Ok(normalizer)
    }

    /// Normalization used by Keras `resnet50.preprocess_input` ("caffe" mode).
    ///
    /// No scaling to [0, 1]: RGB is reordered to BGR and the ImageNet channel
    /// means are subtracted, giving values roughly in [-124, 152].
    pub fn caffe_imagenet() -> VisionResult<Self> {
        Self::new(1.0, CAFFE_MEAN_RGB, [1.0, 1.0, 1.0])
    }

    /// Validates the configuration of the NormalizeImage instance.
    pub fn validate_config(&self) -> VisionResult<()> {
        for (i, &alpha) in self.alpha.iter().enumerate() {
            if !alpha.is_finite() {
                return Err(VisionError::config_error(format!(
                    "Alpha value at index {i} is not finite: {alpha}"
                )));
            }
        }
        for (i, &beta) in self.beta.iter().enumerate() {
            if !beta.is_finite() {
                return Err(VisionError::config_error(format!(
                    "Beta value at index {i} is not finite: {beta}"
                )));
            }
        }
        Ok(())
    }

    /// Normalizes a single image into a tensor with a leading batch axis of 1.
    pub fn normalize_to(&self, img: &RgbImage) -> VisionResult<Tensor4D> {
        let (width, height) = img.dimensions();
        let (width, height) = (width as usize, height as usize);
        let mut result = vec![0.0f32; height * width * 3];
        for (x, y, pixel) in img.enumerate_pixels() {
            let base = (y as usize * width + x as usize) * 3;
            for c in 0..3 {
                // BGR: output channel c reads source channel 2 - c.
                let src = 2 - c;
                result[base + c] = pixel[src] as f32 * self.alpha[src] + self.beta[src];
            }
        }

        Tensor4D::from_shape_vec((1, height, width, 3), result).map_err(|e| {
            VisionError::normalization(
                &format!("failed to create tensor for {width}x{height} image"),
                e,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_caffe_coefficients() {
        let norm = NormalizeImage::caffe_imagenet().unwrap();
        assert_eq!(norm.alpha, [1.0, 1.0, 1.0]);
        assert_eq!(norm.beta, [-123.68, -116.779, -103.939]);
    }

    #[test]
    fn test_caffe_reverses_channels_and_subtracts_means() {
        let norm = NormalizeImage::caffe_imagenet().unwrap();
        let img = RgbImage::from_pixel(2, 2, Rgb([200, 100, 50]));
        let tensor = norm.normalize_to(&img).unwrap();

        assert_eq!(tensor.shape(), &[1, 2, 2, 3]);
        // Output channel 0 is blue, 2 is red.
        assert_eq!(tensor[[0, 1, 1, 0]], 50.0 - 103.939f32);
        assert_eq!(tensor[[0, 1, 1, 1]], 100.0 - 116.779f32);
        assert_eq!(tensor[[0, 1, 1, 2]], 200.0 - 123.68f32);
    }

    #[test]
    fn test_values_are_not_clipped() {
        let norm = NormalizeImage::caffe_imagenet().unwrap();
        let black = norm
            .normalize_to(&RgbImage::from_pixel(1, 1, Rgb([0, 0, 0])))
            .unwrap();
        let white = norm
            .normalize_to(&RgbImage::from_pixel(1, 1, Rgb([255, 255, 255])))
            .unwrap();
        assert!(black.iter().all(|&v| v < -100.0));
        assert!(white.iter().all(|&v| v > 130.0));
    }

    #[test]
    fn test_hwc_layout_for_non_square_image() {
        let norm = NormalizeImage::new(1.0 / 255.0, [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]).unwrap();
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(2, 1, Rgb([255, 0, 51]));
        let tensor = norm.normalize_to(&img).unwrap();
        assert_eq!(tensor.shape(), &[1, 2, 3, 3]);
        assert!((tensor[[0, 1, 2, 0]] - 0.2).abs() < 1e-6);
        assert_eq!(tensor[[0, 1, 2, 1]], 0.0);
        assert!((tensor[[0, 1, 2, 2]] - 1.0).abs() < 1e-6);
        assert_eq!(tensor[[0, 0, 0, 2]], 0.0);
    }

    #[test]
    fn test_rejects_invalid_std() {
        assert!(NormalizeImage::new(1.0, [0.0; 3], [1.0, 0.0, 1.0]).is_err());
        assert!(NormalizeImage::new(0.0, [0.0; 3], [1.0; 3]).is_err());
    }
}
