//! Image loading for the editor.
//!
//! This module provides functionality for:
//! - Decoding an image from a filesystem path
//! - Decoding an image from an in-memory blob
//! - Trying both in turn for input whose kind is not known up front
//!
//! The detected source format is kept next to the decoded pixels so that
//! in-memory output can be re-encoded the way the image came in.
//!
//! # Examples
//!
//! ```ignore
//! use imageforge_core::decode::load_input;
//!
//! let loaded = load_input("photo.jpg").unwrap();
//! println!("Loaded {}x{}", loaded.dimensions().width, loaded.dimensions().height);
//! ```

mod load;
mod types;

pub use load::{load_blob, load_input, load_path};
pub use types::{Dimensions, LoadedImage};
