//! annt core - bounding-box annotations for image datasets
//!
//! This crate holds images together with their tagged bounding boxes and
//! provides the operations that have to keep the two consistent:
//!
//! - `bbox` - boxes with coupled edge accessors
//! - `annotation` - an image, its boxes and the shared tag colors, with
//!   geometry-preserving rotation
//! - `color` - deterministic, well-spread colors per tag
//! - `transform` - affine matrices, raster warping and rotated bounds
//! - `render` - box overlays drawn onto the image
//! - `loader` - reading a dataset directory
//!
//! # Example
//!
//! ```ignore
//! use annt_core::{loader::Dataset, render::{render_overlay, RenderOptions}};
//!
//! let dataset = Dataset::open("data/animals")?;
//! for annotation in dataset.annotations()? {
//!     let rotated = annotation?.rotate(30.0);
//!     render_overlay(&rotated, &RenderOptions::default())?.save("out.png")?;
//! }
//! ```

pub mod annotation;
pub mod bbox;
pub mod color;
pub mod loader;
pub mod raster;
pub mod render;
pub mod transform;

pub use annotation::Annotation;
pub use bbox::BoundingBox;
pub use color::{
    build_color_map, hsv_to_rgb, index_to_hue, ColorError, ColorMap, ColorScheme, Rgb,
};
pub use loader::{Dataset, LoadError};
pub use raster::Raster;
pub use render::{render_overlay, RenderError, RenderOptions};
pub use transform::{compute_rotated_bounds, Affine2, InterpolationFilter};
