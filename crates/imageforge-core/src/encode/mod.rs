//! Image encoding for editor output.
//!
//! This module provides functionality for:
//! - Encoding an image to an in-memory buffer in a chosen format
//! - Applying a save quality to encoders that honor one (JPEG)
//! - Writing an image to disk, creating missing parent directories and
//!   setting file permissions afterwards
//!
//! # Examples
//!
//! ```ignore
//! use image::ImageFormat;
//! use imageforge_core::encode::encode_image;
//!
//! let bytes = encode_image(&image, ImageFormat::Jpeg, Some(85)).unwrap();
//! println!("Encoded {} bytes", bytes.len());
//! ```

mod output;

pub use output::{effective_quality, encode_image, format_for_path, write_image};
