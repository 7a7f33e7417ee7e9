//! Geometric operations: cropping, resizing and rotation.
//!
//! Each operation is split into a pure geometry step, which turns the
//! editor's arguments into pixel rectangles or target sizes, and a pixel step
//! that hands the actual work to the `image` crate. The geometry steps are
//! where the editor's aspect-ratio conventions live.
//!
//! # Coordinate System
//!
//! - Crop coordinates are in pixels, origin at the top-left corner
//! - Sizes are given height first, matching the editor's argument order
//! - Rotation angles are in degrees, positive = clockwise

mod crop;
mod resize;
mod rotation;

pub use crop::{apply_crop, center_crop_rect, edge_crop_rect, square_crop_rect, CropRect};
pub use resize::{
    apply_resize, apply_thumbnail, aspect_dimensions, infer_dimensions, ratio_dimensions,
    scale_dimensions, ResizeFilter, MAX_TARGET_PIXELS, MAX_TARGET_SIDE,
};
pub use rotation::{apply_rotation, compute_rotated_bounds};
