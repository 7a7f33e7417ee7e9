//! Image rotation onto an expanded canvas.
//!
//! Quarter turns are delegated to the `image` crate's lossless rotations.
//! Any other angle uses inverse mapping: for each pixel in the output image,
//! we calculate where it came from in the source and interpolate the four
//! nearest source pixels. Source pixels outside the image read as the
//! background color, which also antialiases the rotated edges.
//!
//! Positive angles rotate clockwise. With y pointing down, the inverse
//! transform for a clockwise rotation by θ is:
//! ```text
//! src_x =  (dst_x - cx) * cos(θ) + (dst_y - cy) * sin(θ) + src_cx
//! src_y = -(dst_x - cx) * sin(θ) + (dst_y - cy) * cos(θ) + src_cy
//! ```

use image::{DynamicImage, Rgba};

use crate::pixel::{restore_color, run_at_depth, with_alpha, Channel, RgbaBuffer, RgbaPass};

/// Tolerance, in degrees, for treating an angle as an exact quarter turn.
const QUARTER_TURN_EPSILON: f64 = 0.001;

/// Compute the dimensions of the bounding box for a rotated image.
///
/// When an image is rotated, the corners extend beyond the original bounds.
/// This function calculates the minimum bounding box that contains the
/// entire rotated image.
///
/// # Arguments
///
/// * `width` - Original image width
/// * `height` - Original image height
/// * `angle_degrees` - Rotation angle in degrees
///
/// # Returns
///
/// Tuple of (new_width, new_height) for the rotated bounding box.
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    match quarter_turns(angle_degrees) {
        Some(0) | Some(2) => return (width, height),
        Some(_) => return (height, width),
        None => {}
    }

    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();

    let w = width as f64;
    let h = height as f64;

    // The bounding box of a rotated rectangle is:
    // new_w = |w*cos| + |h*sin|
    // new_h = |w*sin| + |h*cos|
    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;

    (new_w.max(1), new_h.max(1))
}

/// Number of clockwise quarter turns if `angle_degrees` is a multiple of 90.
fn quarter_turns(angle_degrees: f64) -> Option<u8> {
    let normalized = angle_degrees.rem_euclid(360.0);
    [0.0, 90.0, 180.0, 270.0, 360.0]
        .iter()
        .position(|target| (normalized - target).abs() < QUARTER_TURN_EPSILON)
        .map(|turns| (turns % 4) as u8)
}

/// Rotate an image clockwise by `angle_degrees`.
///
/// Exact quarter turns keep the pixel format and lose nothing. Other angles
/// produce an image sized to the rotated bounding box, with uncovered areas
/// filled with `background`. The result keeps the source's channel depth and
/// gains an alpha channel if it had none.
pub fn apply_rotation(image: &DynamicImage, angle_degrees: f64, background: Rgba<u8>) -> DynamicImage {
    match quarter_turns(angle_degrees) {
        Some(0) => image.clone(),
        Some(1) => image.rotate90(),
        Some(2) => image.rotate180(),
        Some(3) => image.rotate270(),
        _ => {
            let pass = FreeRotation {
                angle_degrees,
                background,
            };
            restore_color(run_at_depth(image, &pass), with_alpha(image.color()))
        }
    }
}

/// Rotation about the center by an arbitrary angle, with bilinear sampling.
struct FreeRotation {
    angle_degrees: f64,
    background: Rgba<u8>,
}

impl RgbaPass for FreeRotation {
    fn run<T: Channel>(&self, image: RgbaBuffer<T>) -> RgbaBuffer<T>
    where
        image::Rgba<T>: image::Pixel<Subpixel = T>,
    {
        let (src_w, src_h) = image.dimensions();
        let (dst_w, dst_h) = compute_rotated_bounds(src_w, src_h, self.angle_degrees);
        let background = Rgba(self.background.0.map(T::from_u8));

        let angle_rad = self.angle_degrees.to_radians();
        let cos = angle_rad.cos();
        let sin = angle_rad.sin();

        // Centers in continuous coordinates; pixel (i, j) covers [i, i + 1)
        let src_cx = src_w as f64 / 2.0;
        let src_cy = src_h as f64 / 2.0;
        let dst_cx = dst_w as f64 / 2.0;
        let dst_cy = dst_h as f64 / 2.0;

        RgbaBuffer::from_fn(dst_w, dst_h, |dst_x, dst_y| {
            let dx = dst_x as f64 + 0.5 - dst_cx;
            let dy = dst_y as f64 + 0.5 - dst_cy;

            // Back to pixel-center coordinates in the source
            let src_x = dx * cos + dy * sin + src_cx - 0.5;
            let src_y = -dx * sin + dy * cos + src_cy - 0.5;

            sample_bilinear(&image, src_x, src_y, background)
        })
    }
}

/// Read a pixel, treating anything outside the image as background.
#[inline]
fn pixel_or<T: Channel>(image: &RgbaBuffer<T>, x: i64, y: i64, background: Rgba<T>) -> [f64; 4]
where
    image::Rgba<T>: image::Pixel<Subpixel = T>,
{
    let inside = x >= 0 && y >= 0 && x < image.width() as i64 && y < image.height() as i64;
    let p = if inside {
        *image.get_pixel(x as u32, y as u32)
    } else {
        background
    };
    p.0.map(Channel::level)
}

/// Sample a pixel using bilinear interpolation.
///
/// Bilinear interpolation considers the 4 nearest pixels and weights
/// their contribution based on distance.
fn sample_bilinear<T: Channel>(image: &RgbaBuffer<T>, x: f64, y: f64, background: Rgba<T>) -> Rgba<T>
where
    image::Rgba<T>: image::Pixel<Subpixel = T>,
{
    let (w, h) = (image.width() as f64, image.height() as f64);

    // Entirely outside the source, no neighbor can contribute
    if x <= -1.0 || y <= -1.0 || x >= w || y >= h {
        return background;
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = pixel_or(image, x0, y0, background);
    let p10 = pixel_or(image, x0 + 1, y0, background);
    let p01 = pixel_or(image, x0, y0 + 1, background);
    let p11 = pixel_or(image, x0 + 1, y0 + 1, background);

    Rgba(std::array::from_fn(|i| {
        T::from_level(
            p00[i] * (1.0 - fx) * (1.0 - fy)
                + p10[i] * fx * (1.0 - fy)
                + p01[i] * (1.0 - fx) * fy
                + p11[i] * fx * fy,
        )
    }))
}
