//! Geometric transforms applied to rasters and boxes.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner, x to the right, y down
//! - Rotation angles are in degrees, positive = counter-clockwise on screen
//! - Box coordinates and pixel indices share one coordinate space, so a
//!   matrix that moves pixels moves box corners identically

mod affine;
mod rotation;
mod warp;

pub use affine::Affine2;
pub use rotation::{compute_rotated_bounds, rotate_box, rotate_raster, rotation_matrix};
pub use warp::{warp_affine, InterpolationFilter};
