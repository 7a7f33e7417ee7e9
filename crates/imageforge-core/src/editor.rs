//! The fluent image editor.
//!
//! [`ImageEditor`] owns one decoded image and applies a chain of in-place
//! operations to it:
//!
//! ```ignore
//! use imageforge_core::ImageEditor;
//!
//! let mut editor = ImageEditor::new("photo.jpg");
//! editor
//!     .crop_square()
//!     .resize(256, 256, "lanczos", 1.0)
//!     .unsharp(0.0, 0.5, 1.0, 0.05)
//!     .save_to(85, "thumbs/photo.jpg")?;
//! ```
//!
//! Loading and saving are the only steps that can fail. A failed load leaves
//! the editor without an image: every operation then becomes a no-op and
//! every output call returns the load error. The most recent failure is also
//! kept as a message, readable through [`ImageEditor::error_message`].

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use tracing::{debug, error, info, instrument, warn};

use crate::adjustments::{apply_modulation, apply_unsharp, Modulation, UnsharpMask};
use crate::config::EditorConfig;
use crate::decode::{load_blob, load_input, load_path, Dimensions, LoadedImage};
use crate::encode::{effective_quality, encode_image, format_for_path, write_image};
use crate::error::{EditError, UNKNOWN_ERROR};
use crate::transform::{
    apply_crop, apply_resize, apply_rotation, apply_thumbnail, aspect_dimensions,
    center_crop_rect, edge_crop_rect, infer_dimensions, ratio_dimensions, scale_dimensions,
    square_crop_rect, CropRect, ResizeFilter,
};

/// Result of a successful [`ImageEditor::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Saved {
    /// The image was written to this path.
    File(PathBuf),
    /// No path was given; the encoded image.
    Bytes(Vec<u8>),
}

/// Fluent editor around a single decoded image.
///
/// Every mutating method returns `&mut Self`, so operations chain. Each
/// operation computes its result from the current image and swaps it in as a
/// whole; a chain never observes a half-applied step.
#[derive(Debug)]
pub struct ImageEditor {
    /// The current working image; `None` after a failed load.
    image: Option<DynamicImage>,
    /// Format the image was decoded from.
    format: Option<ImageFormat>,
    load_error: Option<EditError>,
    save_quality: u8,
    last_error: String,
    config: EditorConfig,
}

impl ImageEditor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a path or, failing that, from the same input as an
    /// encoded blob.
    pub fn new(input: impl AsRef<[u8]>) -> Self {
        Self::with_config(input, EditorConfig::default())
    }

    /// Like [`ImageEditor::new`], with explicit settings.
    pub fn with_config(input: impl AsRef<[u8]>, config: EditorConfig) -> Self {
        Self::from_load(load_input(input), config)
    }

    /// Load an image from a file path only.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let loaded = load_path(path).map_err(|err| {
            let load_err = EditError::load(path.to_string_lossy().as_bytes());
            error!(error = %err, "{}", load_err);
            load_err
        });
        Self::from_load(loaded, EditorConfig::default())
    }

    /// Load an image from encoded bytes only.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let loaded = load_blob(bytes).map_err(|err| {
            let load_err = EditError::load(bytes);
            error!(error = %err, "{}", load_err);
            load_err
        });
        Self::from_load(loaded, EditorConfig::default())
    }

    /// Wrap an already-decoded image.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::from_load(Ok(LoadedImage::new(image, None)), EditorConfig::default())
    }

    fn from_load(loaded: Result<LoadedImage, EditError>, config: EditorConfig) -> Self {
        let save_quality = config.default_quality;
        match loaded {
            Ok(loaded) => {
                info!(
                    width = loaded.image.width(),
                    height = loaded.image.height(),
                    format = ?loaded.format,
                    "Image loaded for editing"
                );
                Self {
                    image: Some(loaded.image),
                    format: loaded.format,
                    load_error: None,
                    save_quality,
                    last_error: UNKNOWN_ERROR.to_string(),
                    config,
                }
            }
            Err(err) => Self {
                image: None,
                format: None,
                last_error: err.to_string(),
                load_error: Some(err),
                save_quality,
                config,
            },
        }
    }

    // -- Accessors ------------------------------------------------------------

    /// Whether an image was loaded.
    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    /// Current dimensions, read from the image on every call.
    pub fn dimensions(&self) -> Option<Dimensions> {
        self.image.as_ref().map(Dimensions::of)
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> Option<&DynamicImage> {
        self.image.as_ref()
    }

    /// Consume the editor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> Option<DynamicImage> {
        self.image
    }

    /// Format detected when the image was loaded.
    pub fn source_format(&self) -> Option<ImageFormat> {
        self.format
    }

    /// Quality used by the next write to disk.
    pub fn save_quality(&self) -> u8 {
        self.save_quality
    }

    /// Settings this editor was created with.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Message of the most recent failure.
    pub fn error_message(&self) -> &str {
        &self.last_error
    }

    // -- Operations (mutate in place, return &mut Self) -------------------------

    /// Trim pixels from each edge.
    ///
    /// The result is `H - top - bottom` pixels high and `W - right - left`
    /// pixels wide, taken from origin `(left, top)`. Trims that leave nothing
    /// keep the image as it was.
    #[instrument(skip(self))]
    pub fn crop(&mut self, top: u32, right: u32, bottom: u32, left: u32) -> &mut Self {
        self.apply("crop", |image| {
            let rect = edge_crop_rect(Dimensions::of(image), top, right, bottom, left);
            crop_to_rect(image, rect)
        })
    }

    /// Crop a `height` x `width` region from the center.
    #[instrument(skip(self))]
    pub fn crop_to(&mut self, height: u32, width: u32) -> &mut Self {
        self.apply("crop_to", |image| {
            let rect = center_crop_rect(Dimensions::of(image), height, width);
            crop_to_rect(image, rect)
        })
    }

    /// Crop to the largest square, centered horizontally and kept at the top
    /// edge vertically.
    #[instrument(skip(self))]
    pub fn crop_square(&mut self) -> &mut Self {
        self.apply("crop_square", |image| {
            crop_to_rect(image, square_crop_rect(Dimensions::of(image)))
        })
    }

    /// Adjust brightness, saturation and hue, each as a percentage.
    ///
    /// See [`Modulation`] for the hue convention.
    #[instrument(skip(self))]
    pub fn modulate(&mut self, brightness: f64, saturation: f64, hue: f64) -> &mut Self {
        let modulation = Modulation::new(brightness, saturation, hue);
        self.apply("modulate", |image| Some(apply_modulation(image, &modulation)))
    }

    /// [`ImageEditor::modulate`] with the defaults 100, 100, 300.
    pub fn modulate_default(&mut self) -> &mut Self {
        let Modulation {
            brightness,
            saturation,
            hue,
        } = Modulation::default();
        self.modulate(brightness, saturation, hue)
    }

    /// Resize with a named filter, preserving the aspect ratio.
    ///
    /// When both sides are given, landscape images are fitted to `width` and
    /// all others to `height`; a zero side is computed from the aspect ratio.
    /// Unknown filter names use point sampling.
    #[instrument(skip(self))]
    pub fn resize(&mut self, height: u32, width: u32, filter: &str, blur: f32) -> &mut Self {
        self.resize_with_filter(height, width, ResizeFilter::from_name(filter), blur)
    }

    /// [`ImageEditor::resize`] with the lanczos filter and no extra blur.
    pub fn resize_default(&mut self, height: u32, width: u32) -> &mut Self {
        self.resize_with_filter(height, width, ResizeFilter::default(), 1.0)
    }

    /// [`ImageEditor::resize`] with an already-resolved filter.
    pub fn resize_with_filter(
        &mut self,
        height: u32,
        width: u32,
        filter: ResizeFilter,
        blur: f32,
    ) -> &mut Self {
        self.apply("resize", |image| {
            let current = Dimensions::of(image);
            let target = resolve_target(current, aspect_dimensions(current, height, width))?;
            Some(apply_resize(image, target, filter.to_image_filter(), blur))
        })
    }

    /// Resize with bilinear mesh interpolation.
    #[instrument(skip(self))]
    pub fn resize_adaptive(&mut self, height: u32, width: u32) -> &mut Self {
        self.apply("resize_adaptive", |image| {
            let current = Dimensions::of(image);
            let target = resolve_target(current, ratio_dimensions(current, height, width))?;
            Some(apply_resize(image, target, image::imageops::FilterType::Triangle, 1.0))
        })
    }

    /// Resize by nearest-neighbor sampling.
    #[instrument(skip(self))]
    pub fn resize_sample(&mut self, height: u32, width: u32) -> &mut Self {
        self.apply("resize_sample", |image| {
            let current = Dimensions::of(image);
            let target = resolve_target(current, ratio_dimensions(current, height, width))?;
            Some(apply_resize(image, target, image::imageops::FilterType::Nearest, 1.0))
        })
    }

    /// Fast resize fitted to `width` for landscape images, `height` otherwise.
    #[instrument(skip(self))]
    pub fn resize_scale(&mut self, height: u32, width: u32) -> &mut Self {
        self.apply("resize_scale", |image| {
            let current = Dimensions::of(image);
            let target = resolve_target(current, scale_dimensions(current, height, width))?;
            Some(apply_resize(image, target, image::imageops::FilterType::Triangle, 1.0))
        })
    }

    /// Thumbnail-quality resize using the same sizing rule as `resize`.
    #[instrument(skip(self))]
    pub fn resize_thumbnail(&mut self, height: u32, width: u32) -> &mut Self {
        self.apply("resize_thumbnail", |image| {
            let current = Dimensions::of(image);
            let target = resolve_target(current, aspect_dimensions(current, height, width))?;
            Some(apply_thumbnail(image, target))
        })
    }

    /// Rotate clockwise by `degrees`, filling uncovered canvas with the
    /// configured background.
    #[instrument(skip(self))]
    pub fn rotate(&mut self, degrees: f64) -> &mut Self {
        let background = self.config.background_pixel();
        self.apply("rotate", |image| {
            let rotated = apply_rotation(image, degrees, background);
            debug!(width = rotated.width(), height = rotated.height(), "Rotation applied");
            Some(rotated)
        })
    }

    /// Sharpen with an unsharp mask.
    #[instrument(skip(self))]
    pub fn unsharp(&mut self, radius: f64, sigma: f64, amount: f64, threshold: f64) -> &mut Self {
        let mask = UnsharpMask::new(radius, sigma, amount, threshold);
        self.apply("unsharp", |image| Some(apply_unsharp(image, &mask)))
    }

    /// Run `op` against the current image and swap in its result.
    ///
    /// `None` from `op` leaves the image untouched.
    fn apply(
        &mut self,
        name: &str,
        op: impl FnOnce(&DynamicImage) -> Option<DynamicImage>,
    ) -> &mut Self {
        let next = match self.image.as_ref() {
            Some(image) => op(image),
            None => {
                debug!(operation = name, "No image loaded, skipping");
                None
            }
        };
        if let Some(next) = next {
            self.image = Some(next);
        }
        self
    }

    // -- Output ---------------------------------------------------------------

    /// Record `quality` and output the image.
    ///
    /// With a path, the image is written there (see [`write_image`]) and
    /// `quality` applies if the format honors one. Without a path, the
    /// encoded bytes are returned in the source format and `quality` is only
    /// remembered for the next write.
    pub fn save(&mut self, quality: u8, path: Option<&Path>) -> Result<Saved, EditError> {
        self.save_quality = quality;
        match path {
            Some(path) => self
                .write_current(path)
                .map(|()| Saved::File(path.to_path_buf())),
            None => self.encode_current().map(Saved::Bytes),
        }
    }

    /// Save to a path.
    pub fn save_to(&mut self, quality: u8, path: impl AsRef<Path>) -> Result<(), EditError> {
        self.save_quality = quality;
        self.write_current(path.as_ref())
    }

    /// Encode the current image without writing it anywhere.
    pub fn view(&mut self) -> Result<Vec<u8>, EditError> {
        self.encode_current()
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    fn write_current(&mut self, path: &Path) -> Result<(), EditError> {
        let result = self.current_image().and_then(|image| {
            let format = format_for_path(path)
                .or(self.format)
                .unwrap_or_else(|| self.config.fallback_format.to_image_format());
            write_image(
                image,
                path,
                format,
                effective_quality(self.save_quality),
                self.config.file_mode,
            )
        });
        self.record(result)
    }

    fn encode_current(&mut self) -> Result<Vec<u8>, EditError> {
        let result = self.current_image().and_then(|image| {
            let format = self
                .format
                .unwrap_or_else(|| self.config.fallback_format.to_image_format());
            encode_image(image, format, None).map_err(|err| {
                error!(error = %err, ?format, "In-memory encoding failed");
                EditError::encode(err)
            })
        });
        self.record(result)
    }

    fn current_image(&self) -> Result<&DynamicImage, EditError> {
        self.image.as_ref().ok_or_else(|| {
            self.load_error
                .clone()
                .unwrap_or_else(|| EditError::load(&[]))
        })
    }

    /// Keep the message of a failed result as the last error.
    fn record<T>(&mut self, result: Result<T, EditError>) -> Result<T, EditError> {
        if let Err(err) = &result {
            self.last_error = err.to_string();
        }
        result
    }
}

fn crop_to_rect(image: &DynamicImage, rect: Option<CropRect>) -> Option<DynamicImage> {
    match rect {
        Some(rect) => {
            info!(
                x = rect.x,
                y = rect.y,
                width = rect.width,
                height = rect.height,
                "Cropping image"
            );
            Some(apply_crop(image, rect))
        }
        None => {
            warn!("Crop region is empty, image left unchanged");
            None
        }
    }
}

fn resolve_target(current: Dimensions, requested: Dimensions) -> Option<Dimensions> {
    match infer_dimensions(current, requested) {
        Some(target) => {
            info!(
                from_w = current.width,
                from_h = current.height,
                to_w = target.width,
                to_h = target.height,
                "Resizing image"
            );
            Some(target)
        }
        None => {
            warn!(
                ?requested,
                "Resize target is empty or too large, image left unchanged"
            );
            None
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use image::RgbImage;
    use proptest::prelude::*;

    fn editor(width: u32, height: u32) -> ImageEditor {
        ImageEditor::from_dynamic(DynamicImage::ImageRgb8(RgbImage::new(width, height)))
    }

    proptest! {
        /// Property: Edge crops remove exactly the requested pixels.
        #[test]
        fn prop_crop_dimensions(
            (t, r, b, l) in (0u32..32, 0u32..32, 0u32..32, 0u32..32),
            (extra_h, extra_w) in (1u32..=32, 1u32..=32),
        ) {
            let height = t + b + extra_h;
            let width = r + l + extra_w;

            let mut editor = editor(width, height);
            editor.crop(t, r, b, l);
            let dims = editor.dimensions().unwrap();

            prop_assert_eq!(dims.height, height - t - b);
            prop_assert_eq!(dims.width, width - r - l);
        }

        /// Property: Square crop yields min(H, W) on both sides.
        #[test]
        fn prop_crop_square(
            (width, height) in (1u32..=64, 1u32..=64),
        ) {
            let mut editor = editor(width, height);
            editor.crop_square();
            let dims = editor.dimensions().unwrap();
            let side = width.min(height);

            prop_assert_eq!(dims, Dimensions::new(side, side));
        }

        /// Property: Height-only resize of a portrait image keeps the aspect ratio.
        #[test]
        fn prop_resize_height_only_keeps_aspect(
            (width, extra) in (4u32..=48, 0u32..=48),
            target in 2u32..=64,
        ) {
            let height = width + extra;
            let mut editor = editor(width, height);
            editor.resize_default(target, 0);
            let dims = editor.dimensions().unwrap();

            let expected_w = ((width as f64 * target as f64 / height as f64).round() as u32).max(1);
            prop_assert_eq!(dims.height, target);
            prop_assert_eq!(dims.width, expected_w);
        }
    }
}
