//! Constants shared across the service.

/// Side length of the square model input, in pixels.
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Per-channel means subtracted during normalization, in RGB order.
///
/// These are the ImageNet "caffe" means the ResNet50 backbone was trained with;
/// they are applied after the tensor is reordered to BGR.
pub const CAFFE_MEAN_RGB: [f32; 3] = [123.68, 116.779, 103.939];

/// Version reported by the HTTP API and in `modelInfo`.
pub const API_VERSION: &str = "1.0.0";

/// Service name reported by the root endpoint.
pub const SERVICE_NAME: &str = "SaccharumVision API";

/// Rotation applied to the raw image for the two rotated TTA variants, in degrees.
pub const TTA_ROTATION_DEGREES: f32 = 5.0;

/// JPEG quality used when re-encoding rotated TTA variants.
pub const TTA_JPEG_QUALITY: u8 = 75;

/// Default class names, index-aligned with the model output.
pub const DEFAULT_CLASS_NAMES: [&str; 5] = ["Healthy", "Mosaic", "RedRot", "Rust", "Yellow"];

/// Default bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 7860;

/// Default upper bound for a request body, in bytes.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Default batch size from which batch preprocessing fans out with rayon.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;
