//! Image cropping operations.
//!
//! Crop regions are computed in signed pixel space and then intersected with
//! the canvas, so a region that hangs off an edge keeps only its visible part.
//! A region with no visible part yields `None` and the caller leaves the image
//! untouched.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left corner
//! - x grows to the right, y grows downward
//!
//! # Example
//!
//! ```ignore
//! // Trim 10px from every edge
//! let rect = edge_crop_rect(dims, 10, 10, 10, 10).unwrap();
//! let cropped = apply_crop(&image, rect);
//! ```

use image::DynamicImage;

use crate::decode::Dimensions;

/// A crop rectangle inside the canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Size of the rectangle as dimensions.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.height, self.width)
    }
}

/// Region left after trimming the given number of pixels from each edge.
///
/// The result has height `H - top - bottom` and width `W - right - left`,
/// with origin `(left, top)`. Returns `None` if either side would be empty.
pub fn edge_crop_rect(
    dims: Dimensions,
    top: u32,
    right: u32,
    bottom: u32,
    left: u32,
) -> Option<CropRect> {
    let height = dims.height as i64 - top as i64 - bottom as i64;
    let width = dims.width as i64 - right as i64 - left as i64;
    intersect(dims, left as i64, top as i64, width, height)
}

/// Region of exactly `height` x `width` centered on the canvas.
///
/// The origin is `floor((W - width) / 2), floor((H - height) / 2)`. A target
/// larger than the canvas is clipped to it.
pub fn center_crop_rect(dims: Dimensions, height: u32, width: u32) -> Option<CropRect> {
    let x = (dims.width as i64 - width as i64).div_euclid(2);
    let y = (dims.height as i64 - height as i64).div_euclid(2);
    intersect(dims, x, y, width as i64, height as i64)
}

/// Largest square region, centered horizontally and aligned to the top.
///
/// The vertical origin is always 0, even for portrait images.
pub fn square_crop_rect(dims: Dimensions) -> Option<CropRect> {
    let side = dims.height.min(dims.width) as i64;
    let x = (dims.width as i64 - side).div_euclid(2);
    intersect(dims, x, 0, side, side)
}

/// Clip a signed rectangle to the canvas.
fn intersect(dims: Dimensions, x: i64, y: i64, width: i64, height: i64) -> Option<CropRect> {
    if width <= 0 || height <= 0 {
        return None;
    }

    let left = x.max(0);
    let top = y.max(0);
    let right = (x + width).min(dims.width as i64);
    let bottom = (y + height).min(dims.height as i64);

    if right <= left || bottom <= top {
        return None;
    }

    Some(CropRect {
        x: left as u32,
        y: top as u32,
        width: (right - left) as u32,
        height: (bottom - top) as u32,
    })
}

/// Cut `rect` out of `image`.
pub fn apply_crop(image: &DynamicImage, rect: CropRect) -> DynamicImage {
    image.crop_imm(rect.x, rect.y, rect.width, rect.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Luma, GrayImage};

    /// Create a test image where each pixel has a unique value based on position.
    fn test_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, y| {
            Luma([((y * width + x) % 256) as u8])
        }))
    }

    #[test]
    fn test_edge_crop() {
        let rect = edge_crop_rect(Dimensions::new(100, 200), 10, 20, 30, 40).unwrap();
        assert_eq!(rect, CropRect { x: 40, y: 10, width: 140, height: 60 });
    }

    #[test]
    fn test_edge_crop_nothing_trimmed() {
        let rect = edge_crop_rect(Dimensions::new(50, 60), 0, 0, 0, 0).unwrap();
        assert_eq!(rect, CropRect { x: 0, y: 0, width: 60, height: 50 });
    }

    #[test]
    fn test_edge_crop_overlapping_trims() {
        assert!(edge_crop_rect(Dimensions::new(50, 60), 30, 0, 20, 0).is_none());
        assert!(edge_crop_rect(Dimensions::new(50, 60), 0, 40, 0, 40).is_none());
    }

    #[test]
    fn test_center_crop() {
        let rect = center_crop_rect(Dimensions::new(100, 200), 50, 50).unwrap();
        assert_eq!(rect, CropRect { x: 75, y: 25, width: 50, height: 50 });
    }

    #[test]
    fn test_center_crop_odd_difference_floors() {
        let rect = center_crop_rect(Dimensions::new(10, 11), 10, 8).unwrap();
        // (11 - 8) / 2 = 1.5 -> 1
        assert_eq!(rect.x, 1);
        assert_eq!(rect.y, 0);
    }

    #[test]
    fn test_center_crop_larger_than_canvas_is_clipped() {
        let rect = center_crop_rect(Dimensions::new(40, 40), 60, 100).unwrap();
        assert_eq!(rect, CropRect { x: 0, y: 0, width: 40, height: 40 });
    }

    #[test]
    fn test_center_crop_zero_size() {
        assert!(center_crop_rect(Dimensions::new(40, 40), 0, 10).is_none());
    }

    #[test]
    fn test_square_crop_landscape() {
        let rect = square_crop_rect(Dimensions::new(350, 450)).unwrap();
        assert_eq!(rect, CropRect { x: 50, y: 0, width: 350, height: 350 });
    }

    #[test]
    fn test_square_crop_portrait_is_top_aligned() {
        let rect = square_crop_rect(Dimensions::new(450, 350)).unwrap();
        assert_eq!(rect, CropRect { x: 0, y: 0, width: 350, height: 350 });
    }

    #[test]
    fn test_apply_crop_pixels() {
        let img = test_image(10, 10);
        let cropped = apply_crop(&img, CropRect { x: 3, y: 3, width: 4, height: 2 });

        assert_eq!(cropped.dimensions(), (4, 2));
        // Value at (3, 3) = 3 * 10 + 3 = 33
        assert_eq!(cropped.get_pixel(0, 0)[0], 33);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
