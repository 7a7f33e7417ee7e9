//! Resize geometry and filter selection.
//!
//! Every resize entry point of the editor reduces its arguments to a target
//! size in two steps: an entry-point specific rule picks the requested height
//! and width (possibly zeroing one of them), then [`infer_dimensions`] fills a
//! zeroed side from the current aspect ratio. The pixel work is left to the
//! `image` crate's resamplers.

use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::decode::Dimensions;

/// Largest side a resize may produce; the JPEG and GIF format limit.
pub const MAX_TARGET_SIDE: u32 = 65_535;

/// Largest pixel count a resize may produce.
pub const MAX_TARGET_PIXELS: u64 = 1 << 28;

/// Named resampling filter accepted by `resize`.
///
/// The names follow the filter vocabulary of ImageMagick. Each one is served
/// by the closest kernel the `image` crate provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    /// Nearest neighbor. Also the fallback for unknown names.
    Point,
    Box,
    Triangle,
    Hermite,
    Hanning,
    Hamming,
    Blackman,
    Gaussian,
    Quadratic,
    Cubic,
    Catrom,
    Mitchell,
    #[default]
    Lanczos,
    Bessel,
    Sinc,
    Kaiser,
    Welsh,
    Parzen,
    Lagrange,
    SincFast,
    LanczosSharp,
    Lanczos2,
    Lanczos2Sharp,
    Robidoux,
    RobidouxSharp,
    Cosine,
    Spline,
    Jinc,
}

impl ResizeFilter {
    /// Resolve a filter name, case-insensitively.
    ///
    /// Unrecognized names resolve to [`ResizeFilter::Point`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "point" => ResizeFilter::Point,
            "box" => ResizeFilter::Box,
            "triangle" => ResizeFilter::Triangle,
            "hermite" => ResizeFilter::Hermite,
            "hanning" => ResizeFilter::Hanning,
            "hamming" => ResizeFilter::Hamming,
            "blackman" => ResizeFilter::Blackman,
            "gaussian" => ResizeFilter::Gaussian,
            "quadratic" => ResizeFilter::Quadratic,
            "cubic" => ResizeFilter::Cubic,
            "catrom" => ResizeFilter::Catrom,
            "mitchell" => ResizeFilter::Mitchell,
            "lanczos" => ResizeFilter::Lanczos,
            "bessel" => ResizeFilter::Bessel,
            "sinc" => ResizeFilter::Sinc,
            "kaiser" => ResizeFilter::Kaiser,
            "welsh" | "welch" => ResizeFilter::Welsh,
            "parzen" => ResizeFilter::Parzen,
            "lagrange" => ResizeFilter::Lagrange,
            "sincfast" => ResizeFilter::SincFast,
            "lanczossharp" => ResizeFilter::LanczosSharp,
            "lanczos2" => ResizeFilter::Lanczos2,
            "lanczos2sharp" => ResizeFilter::Lanczos2Sharp,
            "robidoux" => ResizeFilter::Robidoux,
            "robidouxsharp" => ResizeFilter::RobidouxSharp,
            "cosine" => ResizeFilter::Cosine,
            "spline" => ResizeFilter::Spline,
            "jinc" => ResizeFilter::Jinc,
            _ => ResizeFilter::Point,
        }
    }

    /// Convert to the image crate's FilterType.
    ///
    /// Only `Point` samples the nearest pixel; box averages through the
    /// triangle kernel.
    pub fn to_image_filter(self) -> FilterType {
        match self {
            ResizeFilter::Point => FilterType::Nearest,
            ResizeFilter::Box
            | ResizeFilter::Triangle
            | ResizeFilter::Hermite
            | ResizeFilter::Lagrange => FilterType::Triangle,
            ResizeFilter::Gaussian
            | ResizeFilter::Quadratic
            | ResizeFilter::Parzen
            | ResizeFilter::Spline => FilterType::Gaussian,
            ResizeFilter::Cubic
            | ResizeFilter::Catrom
            | ResizeFilter::Mitchell
            | ResizeFilter::Robidoux
            | ResizeFilter::RobidouxSharp => FilterType::CatmullRom,
            ResizeFilter::Hanning
            | ResizeFilter::Hamming
            | ResizeFilter::Blackman
            | ResizeFilter::Lanczos
            | ResizeFilter::Bessel
            | ResizeFilter::Sinc
            | ResizeFilter::Kaiser
            | ResizeFilter::Welsh
            | ResizeFilter::SincFast
            | ResizeFilter::LanczosSharp
            | ResizeFilter::Lanczos2
            | ResizeFilter::Lanczos2Sharp
            | ResizeFilter::Cosine
            | ResizeFilter::Jinc => FilterType::Lanczos3,
        }
    }
}

/// Requested size for `resize` and `resize_thumbnail`.
///
/// When both sides are given, only the one matching the image orientation is
/// kept: landscape images (ratio < 1) keep the width, all others keep the
/// height. The other side is zeroed and later inferred.
pub fn aspect_dimensions(current: Dimensions, height: u32, width: u32) -> Dimensions {
    if height != 0 && width != 0 {
        scale_dimensions(current, height, width)
    } else {
        Dimensions::new(height, width)
    }
}

/// Requested size for `resize_scale`.
///
/// Same orientation rule as [`aspect_dimensions`], applied even when one side
/// is already zero.
pub fn scale_dimensions(current: Dimensions, height: u32, width: u32) -> Dimensions {
    if current.ratio() < 1.0 {
        Dimensions::new(0, width)
    } else {
        Dimensions::new(height, 0)
    }
}

/// Requested size for `resize_adaptive` and `resize_sample`.
///
/// Landscape images keep the width and take `floor(ratio * width)` as height;
/// all others keep the height and take `floor(ratio * height)` as width.
pub fn ratio_dimensions(current: Dimensions, height: u32, width: u32) -> Dimensions {
    let ratio = current.ratio();
    if ratio < 1.0 {
        Dimensions::new((ratio * width as f64).floor() as u32, width)
    } else {
        Dimensions::new(height, (ratio * height as f64).floor() as u32)
    }
}

/// Fill a zero side of `requested` from the aspect ratio of `current`.
///
/// Returns `None` when both sides are zero, the current image is empty, or
/// the resulting size exceeds [`MAX_TARGET_SIDE`] or [`MAX_TARGET_PIXELS`].
/// An inferred side is rounded to the nearest pixel and never below 1.
pub fn infer_dimensions(current: Dimensions, requested: Dimensions) -> Option<Dimensions> {
    if current.is_empty() {
        return None;
    }

    let (h, w) = (current.height as f64, current.width as f64);
    let (height, width) = match (requested.height, requested.width) {
        (0, 0) => return None,
        (0, width) => ((h * width as f64 / w).round().max(1.0), width as f64),
        (height, 0) => (height as f64, (w * height as f64 / h).round().max(1.0)),
        (height, width) => (height as f64, width as f64),
    };

    let limit = MAX_TARGET_SIDE as f64;
    if height > limit || width > limit || height * width > MAX_TARGET_PIXELS as f64 {
        return None;
    }

    Some(Dimensions::new(height as u32, width as u32))
}

/// Resample `image` to exactly `target`, then soften it if `blur > 1`.
///
/// `blur` follows the usual resize convention: 1.0 leaves the filter as is,
/// larger values blur. The extra softness is applied as a gaussian blur with
/// sigma `blur - 1`.
pub fn apply_resize(
    image: &DynamicImage,
    target: Dimensions,
    filter: FilterType,
    blur: f32,
) -> DynamicImage {
    let resized = image.resize_exact(target.width, target.height, filter);
    if blur > 1.0 {
        resized.blur(blur - 1.0)
    } else {
        resized
    }
}

/// Fast thumbnail resampling to exactly `target`.
pub fn apply_thumbnail(image: &DynamicImage, target: Dimensions) -> DynamicImage {
    image.thumbnail_exact(target.width, target.height)
}
