//! Deterministic geometric transforms used by test-time augmentation.

use crate::core::{Tensor4D, VisionError, VisionResult};
use image::{Rgb, RgbImage, codecs::jpeg::JpegEncoder};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use ndarray::s;

/// Mirrors a normalized `(N, H, W, C)` tensor along its width axis.
pub fn flip_width(tensor: &Tensor4D) -> Tensor4D {
    tensor.slice(s![.., .., ..;-1, ..]).to_owned()
}

/// Rotates an image counter-clockwise by `degrees` about its center.
///
/// The canvas keeps its size, samples with nearest neighbour, and fills the
/// uncovered corners with black.
pub fn rotate_ccw(img: &RgbImage, degrees: f32) -> RgbImage {
    // imageproc rotates clockwise for positive angles.
    rotate_about_center(
        img,
        -degrees.to_radians(),
        Interpolation::Nearest,
        Rgb([0, 0, 0]),
    )
}

/// Encodes an RGB image as JPEG with the given quality.
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> VisionResult<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    img.write_with_encoder(encoder)
        .map_err(|e| VisionError::augmentation("failed to re-encode variant as JPEG", e))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_width_mirrors_columns() {
        let tensor = Tensor4D::from_shape_fn((1, 2, 3, 3), |(_, y, x, c)| {
            (y * 100 + x * 10 + c) as f32
        });
        let flipped = flip_width(&tensor);
        assert_eq!(flipped.shape(), tensor.shape());
        for y in 0..2 {
            for x in 0..3 {
                for c in 0..3 {
                    assert_eq!(flipped[[0, y, x, c]], tensor[[0, y, 2 - x, c]]);
                }
            }
        }
        // Flipping twice restores the original.
        assert_eq!(flip_width(&flipped), tensor);
    }

    #[test]
    fn test_rotate_keeps_canvas_and_fills_black() {
        let img = RgbImage::from_pixel(40, 20, Rgb([255, 255, 255]));
        let rotated = rotate_ccw(&img, 5.0);
        assert_eq!(rotated.dimensions(), (40, 20));
        // The center stays white, corners are uncovered.
        assert_eq!(rotated.get_pixel(20, 10), &Rgb([255, 255, 255]));
        let black_corners = [(0, 0), (39, 0), (0, 19), (39, 19)]
            .iter()
            .filter(|&&(x, y)| rotated.get_pixel(x, y) == &Rgb([0, 0, 0]))
            .count();
        assert!(black_corners >= 2);
    }

    #[test]
    fn test_rotation_direction_is_counter_clockwise() {
        // A block right of the center moves above it under a
        // counter-clockwise rotation.
        let mut img = RgbImage::new(101, 101);
        for y in 45..=55 {
            for x in 80..=95 {
                img.put_pixel(x, y, Rgb([255, 0, 0]));
            }
        }
        let rotated = rotate_ccw(&img, 90.0);
        assert_eq!(rotated.get_pixel(50, 12), &Rgb([255, 0, 0]));
        assert_eq!(rotated.get_pixel(50, 88), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_encode_jpeg_round_trips_dimensions() {
        let img = RgbImage::from_pixel(16, 8, Rgb([10, 200, 30]));
        let bytes = encode_jpeg(&img, 75).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }
}
