//! Raw bytes to model input tensor.

use crate::core::constants::DEFAULT_INPUT_SIZE;
use crate::core::{Tensor4D, VisionError, VisionResult};
use crate::processors::normalization::NormalizeImage;
use image::{DynamicImage, RgbImage, imageops::FilterType};
use tracing::debug;

/// Decodes image bytes, sniffing the format from the content.
pub fn decode_image(bytes: &[u8]) -> VisionResult<DynamicImage> {
    image::load_from_memory(bytes).map_err(VisionError::ImageDecode)
}

/// Decodes image bytes and converts the result to 8-bit RGB.
///
/// Alpha is dropped, grayscale is replicated, palettes are expanded.
pub fn decode_rgb(bytes: &[u8]) -> VisionResult<RgbImage> {
    Ok(decode_image(bytes)?.to_rgb8())
}

/// Turns raw image bytes into the tensor the classifier was trained on.
///
/// Decode, convert to RGB, resize to a square with Lanczos3, normalize, and
/// prepend a batch axis. The default configuration yields `(1, 224, 224, 3)`
/// in BGR order with the ImageNet caffe means subtracted.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    input_size: u32,
    resize_filter: FilterType,
    normalizer: NormalizeImage,
}

impl ImagePreprocessor {
    /// Creates a preprocessor with an explicit size, filter and normalizer.
    pub fn new(input_size: u32, resize_filter: FilterType, normalizer: NormalizeImage) -> Self {
        Self {
            input_size,
            resize_filter,
            normalizer,
        }
    }

    /// The preprocessing used by the ResNet50 disease classifier.
    pub fn resnet50() -> VisionResult<Self> {
        Ok(Self::new(
            DEFAULT_INPUT_SIZE,
            FilterType::Lanczos3,
            NormalizeImage::caffe_imagenet()?,
        ))
    }

    /// Side length of the square model input.
    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    /// Decodes and preprocesses raw image bytes.
    pub fn preprocess(&self, bytes: &[u8]) -> VisionResult<Tensor4D> {
        let rgb = decode_rgb(bytes)?;
        debug!("Decoded image: {}x{}", rgb.width(), rgb.height());
        self.preprocess_rgb(&rgb)
    }

    /// Resizes an RGB image to the model input size without normalizing.
    pub fn resize(&self, img: &RgbImage) -> RgbImage {
        image::imageops::resize(img, self.input_size, self.input_size, self.resize_filter)
    }

    /// Preprocesses an already decoded RGB image.
    pub fn preprocess_rgb(&self, img: &RgbImage) -> VisionResult<Tensor4D> {
        let resized = self.resize(img);
        let tensor = self.normalizer.normalize_to(&resized)?;
        if tracing::enabled!(tracing::Level::DEBUG) {
            let (min, max) = tensor
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            debug!(
                "Preprocessed tensor: shape={:?}, range=[{:.2}, {:.2}]",
                tensor.shape(),
                min,
                max
            );
        }
        Ok(tensor)
    }
}
