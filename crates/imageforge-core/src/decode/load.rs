//! Path and blob decoding with the path-then-blob fallback.

use std::io::Cursor;
use std::path::Path;

use image::{ImageReader, ImageResult};
use tracing::{debug, error, instrument};

use super::LoadedImage;
use crate::error::EditError;

/// Decode the image stored at `path`.
///
/// The format is sniffed from the file contents rather than the extension.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_path(path: impl AsRef<Path>) -> ImageResult<LoadedImage> {
    let reader = ImageReader::open(path.as_ref())?.with_guessed_format()?;
    let format = reader.format();
    let image = reader.decode()?;
    debug!(
        width = image.width(),
        height = image.height(),
        ?format,
        "Image decoded from path"
    );
    Ok(LoadedImage::new(image, format))
}

/// Decode an encoded image held in memory.
#[instrument(skip(bytes), fields(data_len = bytes.len()))]
pub fn load_blob(bytes: &[u8]) -> ImageResult<LoadedImage> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader.format();
    let image = reader.decode()?;
    debug!(
        width = image.width(),
        height = image.height(),
        ?format,
        "Image decoded from blob"
    );
    Ok(LoadedImage::new(image, format))
}

/// Decode input that may be either a path or a blob.
///
/// UTF-8 input is tried as a path first; whatever the outcome of that
/// attempt, the same bytes are then decoded as a blob. Only when both fail is
/// an error returned.
pub fn load_input(input: impl AsRef<[u8]>) -> Result<LoadedImage, EditError> {
    let input = input.as_ref();

    if let Ok(path) = std::str::from_utf8(input) {
        match load_path(path) {
            Ok(loaded) => return Ok(loaded),
            Err(err) => debug!(error = %err, "Input is not a readable image path"),
        }
    }

    load_blob(input).map_err(|err| {
        let load_err = EditError::load(input);
        error!(error = %err, "{}", load_err);
        load_err
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 128]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_load_blob_png() {
        let loaded = load_blob(&png_bytes(20, 10)).unwrap();
        assert_eq!(loaded.image.width(), 20);
        assert_eq!(loaded.image.height(), 10);
        assert_eq!(loaded.format, Some(ImageFormat::Png));
    }

    #[test]
    fn test_load_blob_garbage() {
        assert!(load_blob(b"definitely not an image").is_err());
    }

    #[test]
    fn test_load_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.png");
        std::fs::write(&path, png_bytes(8, 6)).unwrap();

        let loaded = load_path(&path).unwrap();
        assert_eq!(loaded.dimensions().width, 8);
        assert_eq!(loaded.dimensions().height, 6);
    }

    #[test]
    fn test_load_path_sniffs_content_not_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mislabelled.jpg");
        std::fs::write(&path, png_bytes(4, 4)).unwrap();

        let loaded = load_path(&path).unwrap();
        assert_eq!(loaded.format, Some(ImageFormat::Png));
    }

    #[test]
    fn test_load_input_prefers_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.png");
        std::fs::write(&path, png_bytes(5, 3)).unwrap();

        let loaded = load_input(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.dimensions().width, 5);
    }

    #[test]
    fn test_load_input_falls_back_to_blob() {
        let loaded = load_input(png_bytes(7, 2)).unwrap();
        assert_eq!(loaded.dimensions().width, 7);
        assert_eq!(loaded.dimensions().height, 2);
    }

    #[test]
    fn test_load_input_both_fail() {
        let err = load_input("/nonexistent/dir/photo.png").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not load image '/nonexistent/dir/photo.png' for editing"
        );
    }
}
