//! ImageForge Core - Fluent image editing library
//!
//! This crate wraps a decoded raster image in a chainable editor: load from a
//! path or an encoded blob, apply crops, resizes, rotation, color modulation
//! and sharpening, then write the result to disk or get it back as bytes.

pub mod adjustments;
pub mod config;
pub mod decode;
pub mod editor;
pub mod encode;
pub mod error;
mod pixel;
pub mod transform;

pub use adjustments::{Modulation, UnsharpMask};
pub use config::{EditorConfig, OutputFormat};
pub use decode::Dimensions;
pub use editor::{ImageEditor, Saved};
pub use error::{EditError, UNKNOWN_ERROR};
pub use transform::{CropRect, ResizeFilter};
