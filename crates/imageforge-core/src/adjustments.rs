//! Color and sharpness adjustments.
//!
//! ## Modulation
//! Brightness, saturation and hue are adjusted in HSL space. Each parameter
//! is a percentage of the original value, so 100 leaves the channel alone.
//! Hue follows the percent-of-half-turn convention: the hue angle moves by
//! `(hue - 100) * 1.8` degrees, making 0 and 200 opposite shifts of 180°
//! and 300 a full turn.
//!
//! ## Unsharp mask
//! The classic blur-difference sharpen: pixels whose difference from a
//! gaussian-blurred copy exceeds the threshold are pushed further away from
//! it by `amount`.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::pixel::{restore_color, run_at_depth, Channel, RgbaBuffer, RgbaPass};

/// Parameters for [`apply_modulation`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modulation {
    /// Lightness percentage (100 = unchanged)
    pub brightness: f64,
    /// Saturation percentage (100 = unchanged)
    pub saturation: f64,
    /// Hue percentage (100 and 300 = unchanged)
    pub hue: f64,
}

impl Default for Modulation {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            saturation: 100.0,
            hue: 300.0,
        }
    }
}

impl Modulation {
    pub fn new(brightness: f64, saturation: f64, hue: f64) -> Self {
        Self {
            brightness,
            saturation,
            hue,
        }
    }

    /// Hue shift as a fraction of a full turn, in [0, 1).
    pub fn hue_shift(&self) -> f64 {
        (0.5 * (self.hue / 100.0 - 1.0)).rem_euclid(1.0)
    }

    /// Check if applying these parameters would change nothing.
    pub fn is_identity(&self) -> bool {
        let shift = self.hue_shift();
        self.brightness == 100.0
            && self.saturation == 100.0
            && (shift < 1e-9 || 1.0 - shift < 1e-9)
    }
}

/// Parameters for [`apply_unsharp`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnsharpMask {
    /// Kernel radius in pixels; only used to derive sigma when sigma is 0
    pub radius: f64,
    /// Gaussian standard deviation in pixels
    pub sigma: f64,
    /// Fraction of the difference added back (1.0 = 100%)
    pub amount: f64,
    /// Minimum difference to sharpen, as a fraction of full range
    pub threshold: f64,
}

impl UnsharpMask {
    pub fn new(radius: f64, sigma: f64, amount: f64, threshold: f64) -> Self {
        Self {
            radius,
            sigma,
            amount,
            threshold,
        }
    }

    /// Blur sigma to use, or `None` if neither sigma nor radius is positive.
    pub fn effective_sigma(&self) -> Option<f64> {
        if self.sigma > 0.0 {
            Some(self.sigma)
        } else if self.radius > 0.0 {
            Some(self.radius / 3.0)
        } else {
            None
        }
    }
}

/// Apply brightness/saturation/hue modulation to an image.
///
/// Alpha is preserved and the result keeps the source's color type. The
/// work happens at the source's channel depth, so 16-bit and float images
/// keep their precision.
pub fn apply_modulation(image: &DynamicImage, modulation: &Modulation) -> DynamicImage {
    // Early exit if nothing changes
    if modulation.is_identity() {
        return image.clone();
    }

    restore_color(run_at_depth(image, modulation), image.color())
}

impl RgbaPass for Modulation {
    fn run<T: Channel>(&self, mut buffer: RgbaBuffer<T>) -> RgbaBuffer<T>
    where
        image::Rgba<T>: image::Pixel<Subpixel = T>,
    {
        let lightness = self.brightness / 100.0;
        let saturation = self.saturation / 100.0;
        let shift = self.hue_shift();
        let unit = |c: T| c.level() / T::FULL_SCALE;
        let scale = |v: f64| T::from_level(v * T::FULL_SCALE);

        for pixel in buffer.pixels_mut() {
            let [r, g, b, a] = pixel.0;
            let (h, s, l) = rgb_to_hsl(unit(r), unit(g), unit(b));

            let h = (h + shift).rem_euclid(1.0);
            let s = (s * saturation).clamp(0.0, 1.0);
            let l = (l * lightness).clamp(0.0, 1.0);

            let (r, g, b) = hsl_to_rgb(h, s, l);
            pixel.0 = [scale(r), scale(g), scale(b), a];
        }

        buffer
    }
}

/// Sharpen an image with an unsharp mask.
///
/// Only color channels are sharpened; alpha is copied from the source. The
/// result keeps the source's color type and channel depth.
pub fn apply_unsharp(image: &DynamicImage, mask: &UnsharpMask) -> DynamicImage {
    if mask.effective_sigma().is_none() {
        return image.clone();
    }

    restore_color(run_at_depth(image, mask), image.color())
}

impl RgbaPass for UnsharpMask {
    fn run<T: Channel>(&self, mut buffer: RgbaBuffer<T>) -> RgbaBuffer<T>
    where
        image::Rgba<T>: image::Pixel<Subpixel = T>,
    {
        let Some(sigma) = self.effective_sigma() else {
            return buffer;
        };

        let blurred = image::imageops::blur(&buffer, sigma as f32);
        let threshold = T::FULL_SCALE * self.threshold;

        for (pixel, soft) in buffer.pixels_mut().zip(blurred.pixels()) {
            for i in 0..3 {
                pixel[i] = sharpen_channel(pixel[i], soft[i], self.amount, threshold);
            }
        }

        buffer
    }
}

/// Sharpen one channel value against its blurred counterpart.
///
/// Formula: `output = orig + (orig - blurred) * amount` when
/// `|2 * (orig - blurred)| >= threshold`, else `orig`
#[inline]
fn sharpen_channel<T: Channel>(orig: T, blurred: T, amount: f64, threshold: f64) -> T {
    let diff = orig.level() - blurred.level();
    if (2.0 * diff).abs() < threshold {
        return orig;
    }
    T::from_level(orig.level() + diff * amount)
}

/// Convert RGB (each channel in [0, 1]) to HSL, each component in [0, 1].
#[inline]
fn rgb_to_hsl(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let chroma = max - min;

    if chroma <= f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let s = chroma / (1.0 - (2.0 * l - 1.0).abs());
    let h = if max == r {
        ((g - b) / chroma).rem_euclid(6.0)
    } else if max == g {
        (b - r) / chroma + 2.0
    } else {
        (r - g) / chroma + 4.0
    };

    (h / 6.0, s, l)
}

/// Convert HSL (each component in [0, 1]) back to RGB in [0, 1].
#[inline]
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let sector = h * 6.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let m = l - chroma / 2.0;

    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let unit = |v: f64| (v + m).clamp(0.0, 1.0);
    (unit(r), unit(g), unit(b))
}
