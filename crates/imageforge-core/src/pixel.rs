//! Channel-depth aware working buffers.
//!
//! Per-pixel passes (modulation, unsharp masking, free rotation) run on an
//! RGBA buffer whose channel type matches the source: 8-bit sources use
//! `u8`, 16-bit sources `u16`, float sources `f32`. Channel values are
//! handled as `f64` levels on the channel's own scale, so 8-bit results stay
//! exact and wide sources keep their precision. Afterwards
//! [`restore_color`] converts back to the source's color type.

use image::{ColorType, DynamicImage, ImageBuffer, Primitive, Rgba};

/// RGBA buffer with channel type `T`.
pub(crate) type RgbaBuffer<T> = ImageBuffer<Rgba<T>, Vec<T>>;

/// A channel type usable by the working passes.
pub(crate) trait Channel: Primitive + 'static {
    /// Full-scale level.
    const FULL_SCALE: f64;

    fn level(self) -> f64;

    /// Clamp `level` to `[0, FULL_SCALE]`, rounding for integer channels.
    fn from_level(level: f64) -> Self;

    /// Convert an 8-bit component onto this channel's scale.
    #[inline]
    fn from_u8(value: u8) -> Self {
        Self::from_level(value as f64 / 255.0 * Self::FULL_SCALE)
    }
}

impl Channel for u8 {
    const FULL_SCALE: f64 = 255.0;

    #[inline]
    fn level(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_level(level: f64) -> Self {
        level.clamp(0.0, Self::FULL_SCALE).round() as u8
    }
}

impl Channel for u16 {
    const FULL_SCALE: f64 = 65535.0;

    #[inline]
    fn level(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_level(level: f64) -> Self {
        level.clamp(0.0, Self::FULL_SCALE).round() as u16
    }
}

impl Channel for f32 {
    const FULL_SCALE: f64 = 1.0;

    #[inline]
    fn level(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_level(level: f64) -> Self {
        level.clamp(0.0, Self::FULL_SCALE) as f32
    }
}

/// A pass over an RGBA working buffer, generic over channel depth.
pub(crate) trait RgbaPass {
    fn run<T: Channel>(&self, buffer: RgbaBuffer<T>) -> RgbaBuffer<T>
    where
        image::Rgba<T>: image::Pixel<Subpixel = T>;
}

/// Run `pass` on an RGBA copy of `image` at the image's channel depth.
///
/// The result is always an RGBA variant; use [`restore_color`] to get back to
/// the source layout.
pub(crate) fn run_at_depth(image: &DynamicImage, pass: &impl RgbaPass) -> DynamicImage {
    match image.color() {
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => {
            DynamicImage::ImageRgba8(pass.run(image.to_rgba8()))
        }
        ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16 => {
            DynamicImage::ImageRgba16(pass.run(image.to_rgba16()))
        }
        _ => DynamicImage::ImageRgba32F(pass.run(image.to_rgba32f())),
    }
}

/// Convert `image` to `color`.
pub(crate) fn restore_color(image: DynamicImage, color: ColorType) -> DynamicImage {
    if image.color() == color {
        return image;
    }
    match color {
        ColorType::L8 => DynamicImage::ImageLuma8(image.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(image.to_rgb8()),
        ColorType::Rgba8 => DynamicImage::ImageRgba8(image.to_rgba8()),
        ColorType::L16 => DynamicImage::ImageLuma16(image.to_luma16()),
        ColorType::La16 => DynamicImage::ImageLumaA16(image.to_luma_alpha16()),
        ColorType::Rgb16 => DynamicImage::ImageRgb16(image.to_rgb16()),
        ColorType::Rgba16 => DynamicImage::ImageRgba16(image.to_rgba16()),
        ColorType::Rgb32F => DynamicImage::ImageRgb32F(image.to_rgb32f()),
        ColorType::Rgba32F => DynamicImage::ImageRgba32F(image.to_rgba32f()),
        _ => image,
    }
}

/// The variant of `color` that carries an alpha channel.
pub(crate) fn with_alpha(color: ColorType) -> ColorType {
    match color {
        ColorType::L8 => ColorType::La8,
        ColorType::L16 => ColorType::La16,
        ColorType::Rgb8 => ColorType::Rgba8,
        ColorType::Rgb16 => ColorType::Rgba16,
        ColorType::Rgb32F => ColorType::Rgba32F,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma, Rgb};

    struct Invert;

    impl RgbaPass for Invert {
        fn run<T: Channel>(&self, mut buffer: RgbaBuffer<T>) -> RgbaBuffer<T>
        where
            image::Rgba<T>: image::Pixel<Subpixel = T>,
        {
            for pixel in buffer.pixels_mut() {
                for i in 0..3 {
                    pixel[i] = T::from_level(T::FULL_SCALE - pixel[i].level());
                }
            }
            buffer
        }
    }

    #[test]
    fn test_channel_levels() {
        assert_eq!(u8::from_level(300.0), 255);
        assert_eq!(u8::from_level(-4.0), 0);
        assert_eq!(u8::from_level(127.5), 128);
        assert_eq!(u16::from_level(70000.0), 65535);
        assert_eq!(f32::from_level(1.5), 1.0);
        assert_eq!(u16::from_u8(255), 65535);
        assert_eq!(u8::from_u8(17), 17);
    }

    #[test]
    fn test_run_at_depth_8bit() {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(2, 2, Rgb([10u8, 20, 30])));
        let result = run_at_depth(&img, &Invert);

        assert!(matches!(result, DynamicImage::ImageRgba8(_)));
        assert_eq!(result.to_rgb8().get_pixel(0, 0), &Rgb([245, 235, 225]));
    }

    #[test]
    fn test_run_at_depth_keeps_16bit_precision() {
        let img = DynamicImage::ImageRgb16(ImageBuffer::from_pixel(2, 2, Rgb([1000u16, 2000, 3])));
        let result = restore_color(run_at_depth(&img, &Invert), img.color());

        assert!(matches!(result, DynamicImage::ImageRgb16(_)));
        assert_eq!(result.to_rgb16().get_pixel(1, 1), &Rgb([64535, 63535, 65532]));
    }

    #[test]
    fn test_restore_grayscale() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 3, Luma([90])));
        let result = restore_color(run_at_depth(&img, &Invert), img.color());

        assert!(matches!(result, DynamicImage::ImageLuma8(_)));
        assert_eq!(result.to_luma8().get_pixel(2, 2), &Luma([165]));
    }

    #[test]
    fn test_with_alpha() {
        assert_eq!(with_alpha(ColorType::L8), ColorType::La8);
        assert_eq!(with_alpha(ColorType::Rgb16), ColorType::Rgba16);
        assert_eq!(with_alpha(ColorType::Rgba8), ColorType::Rgba8);
    }
}
