//! Image processing for the classifier.
//!
//! # Modules
//!
//! * `augmentation` - Flip, rotation and JPEG re-encoding used by TTA
//! * `normalization` - Channel reordering and mean subtraction
//! * `preprocess` - Bytes to input tensor

pub mod augmentation;
mod normalization;
pub mod preprocess;

pub use augmentation::{encode_jpeg, flip_width, rotate_ccw};
pub use normalization::NormalizeImage;
pub use preprocess::{ImagePreprocessor, decode_image, decode_rgb};
