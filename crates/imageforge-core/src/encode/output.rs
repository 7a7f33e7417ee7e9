//! Encoding to memory and writing to disk.
//!
//! JPEG output is always produced from an RGB copy of the image because the
//! JPEG encoder rejects alpha channels, which rotation introduces. Other
//! formats get the image as is when their encoder supports its color type,
//! and an 8-bit (GIF, BMP) or 16-bit (PNG) copy otherwise.

use std::borrow::Cow;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageFormat, ImageResult};
use tracing::{debug, error, info, instrument, warn};

use crate::error::EditError;

/// Return the quality to hand to the encoder, if any.
///
/// Only values strictly between 0 and 100 are applied; anything else leaves
/// the encoder at its own default.
pub fn effective_quality(quality: u8) -> Option<u8> {
    (quality > 0 && quality < 100).then_some(quality)
}

/// Pick the output format for `path` from its extension.
///
/// Returns `None` when the extension is missing or not a known image format.
pub fn format_for_path(path: &Path) -> Option<ImageFormat> {
    ImageFormat::from_path(path).ok()
}

/// Encode `image` into a byte buffer.
///
/// # Arguments
///
/// * `image` - Image to encode
/// * `format` - Target container format
/// * `quality` - Compression quality (1-99), honored by JPEG only
///
/// # Errors
///
/// Returns the encoder's error if the format cannot be written with the
/// enabled codecs or does not support the image's color type.
pub fn encode_image(
    image: &DynamicImage,
    format: ImageFormat,
    quality: Option<u8>,
) -> ImageResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());

    match (format, quality) {
        (ImageFormat::Jpeg, Some(quality)) => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
            image.to_rgb8().write_with_encoder(encoder)?;
        }
        (ImageFormat::Jpeg, None) => {
            DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut buffer, format)?;
        }
        _ => encodable(image, format).write_to(&mut buffer, format)?,
    }

    Ok(buffer.into_inner())
}

/// Borrow `image` if `format` can encode its color type, else convert it.
fn encodable(image: &DynamicImage, format: ImageFormat) -> Cow<'_, DynamicImage> {
    let color = image.color();
    let has_alpha = color.has_alpha();

    match format {
        ImageFormat::Gif if !matches!(color, ColorType::Rgb8 | ColorType::Rgba8) => {
            Cow::Owned(to_8bit(image, has_alpha))
        }
        ImageFormat::Bmp
            if !matches!(
                color,
                ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8
            ) =>
        {
            Cow::Owned(to_8bit(image, has_alpha))
        }
        ImageFormat::Png if matches!(color, ColorType::Rgb32F | ColorType::Rgba32F) => {
            Cow::Owned(if has_alpha {
                DynamicImage::ImageRgba16(image.to_rgba16())
            } else {
                DynamicImage::ImageRgb16(image.to_rgb16())
            })
        }
        _ => Cow::Borrowed(image),
    }
}

fn to_8bit(image: &DynamicImage, has_alpha: bool) -> DynamicImage {
    if has_alpha {
        DynamicImage::ImageRgba8(image.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
    }
}

/// Write `image` to `path`.
///
/// Missing parent directories are created first. After a successful write the
/// file mode is set to `file_mode` on unix; a failure to change permissions
/// is logged and otherwise ignored.
///
/// # Errors
///
/// Returns [`EditError::Save`] if the directory cannot be created, the image
/// cannot be encoded or the file cannot be written.
#[instrument(skip(image, path), fields(path = %path.display()))]
pub fn write_image(
    image: &DynamicImage,
    path: &Path,
    format: ImageFormat,
    quality: Option<u8>,
    file_mode: u32,
) -> Result<(), EditError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            debug!(dir = %parent.display(), "Creating output directory");
            fs::create_dir_all(parent).map_err(|err| fail(path, err))?;
        }
    }

    let bytes = encode_image(image, format, quality).map_err(|err| fail(path, err))?;
    fs::write(path, &bytes).map_err(|err| fail(path, err))?;

    info!(bytes = bytes.len(), ?format, ?quality, "Image written");

    if let Err(err) = set_file_mode(path, file_mode) {
        warn!(error = %err, mode = %format!("{:o}", file_mode), "Could not set file permissions");
    }

    Ok(())
}

fn fail(path: &Path, reason: impl ToString) -> EditError {
    let reason = reason.to_string();
    error!(%reason, "Could not save image");
    EditError::save(path, reason)
}

#[cfg(unix)]
fn set_file_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_file_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    #[test]
    fn test_effective_quality_bounds() {
        assert_eq!(effective_quality(0), None);
        assert_eq!(effective_quality(1), Some(1));
        assert_eq!(effective_quality(80), Some(80));
        assert_eq!(effective_quality(99), Some(99));
        assert_eq!(effective_quality(100), None);
        assert_eq!(effective_quality(255), None);
    }

    #[test]
    fn test_format_for_path() {
        assert_eq!(format_for_path(Path::new("a/b.jpg")), Some(ImageFormat::Jpeg));
        assert_eq!(format_for_path(Path::new("b.PNG")), Some(ImageFormat::Png));
        assert_eq!(format_for_path(Path::new("noext")), None);
        assert_eq!(format_for_path(Path::new("file.unknownext")), None);
    }

    #[test]
    fn test_encode_jpeg_magic_bytes() {
        let bytes = encode_image(&gradient(32, 32), ImageFormat::Jpeg, Some(90)).unwrap();

        // SOI and EOI markers
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_drops_alpha() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([10, 20, 30, 0])));
        assert!(encode_image(&rgba, ImageFormat::Jpeg, None).is_ok());
        assert!(encode_image(&rgba, ImageFormat::Jpeg, Some(50)).is_ok());
    }

    #[test]
    fn test_encode_jpeg_quality_affects_size() {
        let img = gradient(64, 64);
        let low = encode_image(&img, ImageFormat::Jpeg, Some(10)).unwrap();
        let high = encode_image(&img, ImageFormat::Jpeg, Some(95)).unwrap();
        assert!(high.len() > low.len());
    }

    #[test]
    fn test_encode_png_is_deterministic() {
        let img = gradient(16, 9);
        let a = encode_image(&img, ImageFormat::Png, None).unwrap();
        let b = encode_image(&img, ImageFormat::Png, Some(40)).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[1..4], b"PNG");
    }

    fn wide_gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb16(ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x * 1000) as u16, (y * 1000) as u16, 65535])
        }))
    }

    #[test]
    fn test_encode_16bit_as_gif_and_bmp() {
        let img = wide_gradient(10, 6);

        let gif = encode_image(&img, ImageFormat::Gif, None).unwrap();
        assert_eq!(&gif[0..3], b"GIF");
        let bmp = encode_image(&img, ImageFormat::Bmp, None).unwrap();
        assert_eq!(&bmp[0..2], b"BM");

        let reloaded = image::load_from_memory(&gif).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (10, 6));
    }

    #[test]
    fn test_encode_png_keeps_16bit() {
        let bytes = encode_image(&wide_gradient(4, 4), ImageFormat::Png, None).unwrap();
        let reloaded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(reloaded.color(), ColorType::Rgb16);
    }

    #[test]
    fn test_encode_float_as_png() {
        let img = DynamicImage::ImageRgba32F(ImageBuffer::from_pixel(3, 3, Rgba([0.5f32, 0.25, 1.0, 1.0])));
        let bytes = encode_image(&img, ImageFormat::Png, None).unwrap();
        let reloaded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(reloaded.color(), ColorType::Rgba16);
    }

    #[test]
    fn test_write_16bit_image_as_gif() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.gif");

        write_image(&wide_gradient(8, 5), &path, ImageFormat::Gif, Some(80), 0o644).unwrap();

        let reloaded = image::open(&path).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (8, 5));
    }

    #[test]
    fn test_write_image_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.png");

        write_image(&gradient(12, 8), &path, ImageFormat::Png, None, 0o644).unwrap();

        assert!(path.is_file());
        let reloaded = image::open(&path).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (12, 8));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_image_sets_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        write_image(&gradient(4, 4), &path, ImageFormat::Png, None, 0o640).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn test_write_image_failure_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"plain file").unwrap();
        let path = blocker.join("out.png");

        let err = write_image(&gradient(4, 4), &path, ImageFormat::Png, None, 0o644).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Could not save image '{}'", path.display())
        );
    }
}
