//! Editor configuration.

use image::ImageFormat;
use serde::{Deserialize, Serialize};

/// Save quality used until a caller passes one to `save`.
pub const DEFAULT_SAVE_QUALITY: u8 = 80;

/// Permission bits applied to written files (unix only).
pub const DEFAULT_FILE_MODE: u32 = 0o777;

/// Encoded format used for in-memory output when the source format is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl OutputFormat {
    /// Convert to the image crate's format.
    pub fn to_image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Gif => ImageFormat::Gif,
            OutputFormat::Bmp => ImageFormat::Bmp,
        }
    }
}

/// Settings shared by every operation of one editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Save quality before the first `save` call (1 to 99 is applied).
    pub default_quality: u8,
    /// Mode set on files after a successful write.
    pub file_mode: u32,
    /// RGBA fill for canvas uncovered by rotation.
    pub background: [u8; 4],
    /// Format for in-memory output of images without a known source format.
    pub fallback_format: OutputFormat,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_quality: DEFAULT_SAVE_QUALITY,
            file_mode: DEFAULT_FILE_MODE,
            background: [0, 0, 0, 0],
            fallback_format: OutputFormat::default(),
        }
    }
}

impl EditorConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Background as an image crate pixel.
    pub fn background_pixel(&self) -> image::Rgba<u8> {
        image::Rgba(self.background)
    }
}
