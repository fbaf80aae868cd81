//! Rotation of a raster and of boxes drawn on it.
//!
//! The image is rotated about its center and the canvas grows to the smallest
//! axis-aligned rectangle that holds the whole rotated image. Boxes go through
//! the exact same matrix as the pixels, so they stay on the content they
//! annotate.
//!
//! For a rotation by θ about the source center `(cx, cy)`:
//! ```text
//! new_w = round(|cos θ| * w + |sin θ| * h)
//! new_h = round(|sin θ| * w + |cos θ| * h)
//! M     = rotation(cx, cy, θ) + translation(floor((new_w - w) / 2), floor((new_h - h) / 2))
//! ```

use super::{warp_affine, Affine2, InterpolationFilter};
use crate::bbox::BoundingBox;
use crate::raster::Raster;

/// Compute the dimensions of the canvas holding a rotated image.
///
/// # Arguments
///
/// * `width` - Original image width
/// * `height` - Original image height
/// * `angle_degrees` - Rotation angle in degrees (positive = counter-clockwise)
///
/// # Returns
///
/// Tuple of (new_width, new_height).
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();

    let w = width as f64;
    let h = height as f64;

    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;

    (new_w, new_h)
}

/// Matrix mapping source pixel coordinates into the rotated canvas, together
/// with the canvas size.
///
/// The rotation is about the source center; the translation then centers the
/// rotated content in the new canvas (integer floor division, so odd size
/// differences round toward the top-left).
pub fn rotation_matrix(width: u32, height: u32, angle_degrees: f64) -> (Affine2, (u32, u32)) {
    let (new_w, new_h) = compute_rotated_bounds(width, height, angle_degrees);
    let center = (width as f64 / 2.0, height as f64 / 2.0);

    let dx = (new_w as i64 - width as i64).div_euclid(2);
    let dy = (new_h as i64 - height as i64).div_euclid(2);

    let matrix = Affine2::rotation(center, angle_degrees, 1.0).translated(dx as f64, dy as f64);
    (matrix, (new_w, new_h))
}

/// Map a box through `matrix` and return the axis-aligned box around its
/// four transformed corners, anchored to a `width x height` image.
///
/// Coordinates are truncated toward zero. Unless the rotation is a multiple of
/// 90 degrees the result is larger than the original box.
pub fn rotate_box(bbox: &BoundingBox, matrix: &Affine2, width: u32, height: u32) -> BoundingBox {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for corner in bbox.corners() {
        let (x, y) = matrix.apply(corner);
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    let x = min_x.trunc();
    let y = min_y.trunc();
    let mut rotated = bbox.anchored_to(width, height);
    rotated.x = x;
    rotated.y = y;
    rotated.w = (max_x - x).trunc();
    rotated.h = (max_y - y).trunc();
    rotated
}

/// Rotate an image about its center onto an expanded canvas.
///
/// # Arguments
///
/// * `image` - Source image to rotate
/// * `angle_degrees` - Rotation angle in degrees (positive = counter-clockwise)
/// * `filter` - Interpolation method
pub fn rotate_raster(image: &Raster, angle_degrees: f64, filter: InterpolationFilter) -> Raster {
    let (matrix, (new_w, new_h)) = rotation_matrix(image.width, image.height, angle_degrees);
    warp_affine(image, &matrix, new_w, new_h, filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image(width: u32, height: u32) -> Raster {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((x + y) * 8) as u8;
                pixels.push(v);
                pixels.push(v);
                pixels.push(v);
            }
        }
        Raster::new(width, height, pixels)
    }

    #[test]
    fn test_no_rotation_bounds() {
        assert_eq!(compute_rotated_bounds(100, 50, 0.0), (100, 50));
    }

    #[test]
    fn test_90_degree_rotation_bounds() {
        assert_eq!(compute_rotated_bounds(100, 50, 90.0), (50, 100));
    }

    #[test]
    fn test_180_degree_rotation_bounds() {
        assert_eq!(compute_rotated_bounds(100, 50, 180.0), (100, 50));
    }

    #[test]
    fn test_270_degree_rotation_bounds() {
        assert_eq!(compute_rotated_bounds(100, 50, 270.0), (50, 100));
    }

    #[test]
    fn test_45_degree_rotation_bounds() {
        let (w, h) = compute_rotated_bounds(100, 100, 45.0);
        // Diagonal of 100x100 square is ~141.4
        assert_eq!((w, h), (141, 141));
    }

    #[test]
    fn test_opposite_rotations_same_bounds() {
        assert_eq!(
            compute_rotated_bounds(100, 80, 30.0),
            compute_rotated_bounds(100, 80, -30.0)
        );
    }

    #[test]
    fn test_large_rotation_angles() {
        // 720 degrees = 2 full rotations
        assert_eq!(compute_rotated_bounds(100, 50, 720.0), (100, 50));
        // 450 degrees = 360 + 90
        assert_eq!(compute_rotated_bounds(100, 50, 450.0), (50, 100));
    }

    #[test]
    fn test_matrix_translation_uses_floor_division() {
        // 100x200 at 90 degrees -> 200x100, offsets (50, -50)
        let (m, dims) = rotation_matrix(100, 200, 90.0);
        assert_eq!(dims, (200, 100));
        let (x, y) = m.apply((50.0, 100.0));
        assert!((x - 100.0).abs() < 1e-9 && (y - 50.0).abs() < 1e-9);

        // 3x4 at 90 degrees -> 4x3, offsets (0, -1): floor(-0.5) is -1
        let (m, dims) = rotation_matrix(3, 4, 90.0);
        assert_eq!(dims, (4, 3));
        let (x, y) = m.apply((1.5, 2.0));
        assert!((x - 1.5).abs() < 1e-9 && (y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_box_quarter_turn() {
        let b = BoundingBox::new("tag", 100, 200, 10.0, 10.0, 50.0, 50.0);
        let (m, (nw, nh)) = rotation_matrix(100, 200, 90.0);
        let r = rotate_box(&b, &m, nw, nh);

        // (x, y) -> (y, 100 - x)
        assert!((r.x - 10.0).abs() <= 1.0, "x was {}", r.x);
        assert!((r.y - 40.0).abs() <= 1.0, "y was {}", r.y);
        assert!((r.w - 50.0).abs() <= 1.0, "w was {}", r.w);
        assert!((r.h - 50.0).abs() <= 1.0, "h was {}", r.h);
        assert_eq!((r.image_width(), r.image_height()), (200, 100));
    }

    #[test]
    fn test_rotate_box_grows_at_45_degrees() {
        let b = BoundingBox::new("tag", 100, 100, 40.0, 40.0, 20.0, 20.0);
        let (m, (nw, nh)) = rotation_matrix(100, 100, 45.0);
        let r = rotate_box(&b, &m, nw, nh);

        // Square of side 20 rotated 45 degrees spans 20 * sqrt(2) ~ 28.28,
        // centered on (70, 70): 55.86..84.14, truncated to 55 + 29
        assert_eq!((r.x, r.y), (55.0, 55.0));
        assert_eq!((r.w, r.h), (29.0, 29.0));
    }

    #[test]
    fn test_rotate_box_truncates_toward_zero() {
        // A box left of the canvas keeps negative coordinates
        let b = BoundingBox::new("tag", 10, 10, -5.5, -2.5, 3.0, 1.0);
        let r = rotate_box(&b, &Affine2::identity(), 10, 10);
        assert_eq!((r.x, r.y, r.w, r.h), (-5.0, -2.0, 2.0, 0.0));
    }

    #[test]
    fn test_rotate_raster_no_rotation() {
        let img = test_image(100, 50);
        let result = rotate_raster(&img, 0.0, InterpolationFilter::Bilinear);
        assert_eq!(result, img);
    }

    #[test]
    fn test_rotate_raster_expands_canvas() {
        let img = test_image(100, 100);
        let result = rotate_raster(&img, 45.0, InterpolationFilter::Bilinear);

        assert!(result.width > img.width);
        assert!(result.height > img.height);
        assert_eq!(result.pixels.len(), (result.width * result.height * 3) as usize);
    }

    #[test]
    fn test_rotate_raster_rectangular_quarter_turn() {
        let img = test_image(200, 100);
        let result = rotate_raster(&img, 90.0, InterpolationFilter::Bilinear);
        assert_eq!(result.dimensions(), (100, 200));
    }

    #[test]
    fn test_rotate_raster_quarter_turn_moves_pixels() {
        // A counter-clockwise quarter turn makes the top row the left column
        let mut img = Raster::blank(4, 4);
        for x in 0..4 {
            img.pixels[x * 3] = 255;
        }

        let result = rotate_raster(&img, 90.0, InterpolationFilter::Bilinear);
        for y in 1..4 {
            assert_eq!(result.pixel(0, y), Some([255, 0, 0]), "row {}", y);
        }
        assert_eq!(result.pixel(3, 2), Some([0, 0, 0]));
    }

    #[test]
    fn test_1x1_image_rotation() {
        let img = Raster::new(1, 1, vec![128, 128, 128]);
        let result = rotate_raster(&img, 45.0, InterpolationFilter::Lanczos3);
        assert!(result.width >= 1);
        assert!(result.height >= 1);
    }

    #[test]
    fn test_very_thin_image_rotation() {
        let img = test_image(100, 1);
        let result = rotate_raster(&img, 45.0, InterpolationFilter::Bilinear);
        assert!(result.width > 0);
        assert!(result.height > 0);
    }

    #[test]
    fn test_bounds_never_zero() {
        for angle in [1.0, 15.0, 45.0, 89.0, 90.0, 135.0, 179.0, 180.0, 270.0, 359.0] {
            let (w, h) = compute_rotated_bounds(10, 10, angle);
            assert!(w > 0, "Width should be > 0 for angle {}", angle);
            assert!(h > 0, "Height should be > 0 for angle {}", angle);
        }
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
