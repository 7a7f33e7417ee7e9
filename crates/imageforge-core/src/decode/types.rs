//! Core types for image loading.

use image::{DynamicImage, GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};

/// Pixel dimensions of an image, height first.
///
/// Always derived from the current image; never stored across operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Height in pixels.
    pub height: u32,
    /// Width in pixels.
    pub width: u32,
}

impl Dimensions {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// Read the dimensions of a decoded image.
    pub fn of(image: &DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self { height, width }
    }

    /// Height divided by width. Below 1.0 for landscape images.
    pub fn ratio(self) -> f64 {
        self.height as f64 / self.width as f64
    }

    /// Check if either side is zero.
    pub fn is_empty(self) -> bool {
        self.height == 0 || self.width == 0
    }
}

/// A decoded image together with the format it was decoded from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Decoded pixel data.
    pub image: DynamicImage,
    /// Format detected while decoding, if any.
    pub format: Option<ImageFormat>,
}

impl LoadedImage {
    pub fn new(image: DynamicImage, format: Option<ImageFormat>) -> Self {
        Self { image, format }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::of(&self.image)
    }
}
