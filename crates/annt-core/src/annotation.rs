//! An image together with its tagged boxes.
//!
//! Every box in an [`Annotation`] is anchored to the dimensions of the
//! annotation's raster. Transforms build a new annotation and re-anchor every
//! box, leaving the source untouched.
//!
//! The color map is shared: an annotation and everything rotated from it
//! point at the same `Arc<ColorMap>`. It is filled once per dataset and read
//! afterwards; `Arc::make_mut` forks a private copy if one annotation needs
//! different colors.

use std::fmt;
use std::sync::Arc;

use crate::bbox::BoundingBox;
use crate::color::{ColorMap, Rgb};
use crate::raster::Raster;
use crate::transform::{rotate_box, rotation_matrix, warp_affine, InterpolationFilter};

/// Image and annotation information holder.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Source image file name, if known.
    pub filename: Option<String>,
    /// The annotated image.
    pub image: Raster,
    /// Boxes in annotation-file order.
    pub boxes: Vec<BoundingBox>,
    /// Tag name to display color.
    pub color_map: Arc<ColorMap>,
}

impl Annotation {
    /// Create an annotation with an empty color map.
    pub fn new(filename: Option<String>, image: Raster, boxes: Vec<BoundingBox>) -> Self {
        Self {
            filename,
            image,
            boxes,
            color_map: Arc::new(ColorMap::new()),
        }
    }

    /// Attach a shared color map.
    pub fn with_color_map(mut self, color_map: Arc<ColorMap>) -> Self {
        self.color_map = color_map;
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width
    }

    pub fn height(&self) -> u32 {
        self.image.height
    }

    /// Display color of a tag; tags missing from the map are black.
    pub fn color_for(&self, tag: &str) -> Rgb {
        self.color_map.get(tag).copied().unwrap_or(Rgb::BLACK)
    }

    /// Check that every box is anchored to this annotation's raster.
    pub fn is_anchored(&self) -> bool {
        self.boxes.iter().all(|b| {
            b.image_width() == self.image.width && b.image_height() == self.image.height
        })
    }

    /// Rotate the image and all boxes by `angle_degrees` using bilinear
    /// resampling.
    ///
    /// See [`Annotation::rotate_with`].
    pub fn rotate(&self, angle_degrees: f64) -> Annotation {
        self.rotate_with(angle_degrees, InterpolationFilter::default())
    }

    /// Rotate the image and all boxes by `angle_degrees`.
    ///
    /// The image turns about its center (positive = counter-clockwise) onto a
    /// canvas just large enough to hold it. Each box becomes the axis-aligned
    /// box around its rotated corners, so boxes grow unless the angle is a
    /// multiple of 90 degrees.
    ///
    /// Non-destructive: `self` is unchanged and the returned annotation shares
    /// its color map.
    pub fn rotate_with(&self, angle_degrees: f64, filter: InterpolationFilter) -> Annotation {
        let (matrix, (new_w, new_h)) =
            rotation_matrix(self.image.width, self.image.height, angle_degrees);

        log::debug!(
            "rotating {} by {} degrees: {}x{} -> {}x{}",
            self,
            angle_degrees,
            self.image.width,
            self.image.height,
            new_w,
            new_h
        );

        let image = warp_affine(&self.image, &matrix, new_w, new_h, filter);
        let boxes = self
            .boxes
            .iter()
            .map(|b| rotate_box(b, &matrix, new_w, new_h))
            .collect();

        Annotation {
            filename: self.filename.clone(),
            image,
            boxes,
            color_map: Arc::clone(&self.color_map),
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.filename.as_deref().unwrap_or("<unnamed>"))
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// An annotation with one box inside a small image.
    fn annotation_strategy() -> impl Strategy<Value = Annotation> {
        (8u32..=120, 8u32..=120)
            .prop_flat_map(|(w, h)| (Just(w), Just(h), 0..w, 0..h, 0.0f64..1.0, 0.0f64..1.0))
            .prop_map(|(w, h, x, y, fw, fh)| {
                let bw = ((w - x) as f64 * fw).floor();
                let bh = ((h - y) as f64 * fh).floor();
                let b = BoundingBox::new("tag", w, h, x as f64, y as f64, bw, bh);
                Annotation::new(None, Raster::blank(w, h), vec![b])
            })
    }

    proptest! {
        /// Property: Rotated boxes are anchored to the rotated raster.
        #[test]
        fn prop_rotation_reanchors_boxes(
            ant in annotation_strategy(),
            angle in -360.0f64..360.0,
        ) {
            let rotated = ant.rotate(angle);
            prop_assert!(rotated.is_anchored());
            prop_assert_eq!(
                rotated.image.dimensions(),
                crate::transform::compute_rotated_bounds(ant.width(), ant.height(), angle)
            );
        }

        /// Property: Rotating by an angle and back yields a box that covers the
        /// original, shifted by the canvas growth, within rounding.
        #[test]
        fn prop_rotate_back_covers_original(
            ant in annotation_strategy(),
            angle in -180.0f64..180.0,
        ) {
            let (m1, (w1, h1)) = rotation_matrix(ant.width(), ant.height(), angle);
            let (m2, _) = rotation_matrix(w1, h1, -angle);
            let composed = m1.then(&m2);
            let (tx, ty) = composed.apply((0.0, 0.0));

            let back = ant.rotate(angle).rotate(-angle);
            let (orig, r) = (&ant.boxes[0], &back.boxes[0]);

            let tolerance = 3.0;
            prop_assert!(r.x <= orig.x + tx + tolerance, "left {} vs {}", r.x, orig.x + tx);
            prop_assert!(r.y <= orig.y + ty + tolerance, "top {} vs {}", r.y, orig.y + ty);
            prop_assert!(
                r.x + r.w >= orig.x + orig.w + tx - tolerance,
                "right {} vs {}",
                r.x + r.w,
                orig.x + orig.w + tx
            );
            prop_assert!(
                r.y + r.h >= orig.y + orig.h + ty - tolerance,
                "bottom {} vs {}",
                r.y + r.h,
                orig.y + orig.h + ty
            );
        }

        /// Property: Rotation never mutates its source.
        #[test]
        fn prop_rotation_is_non_destructive(
            ant in annotation_strategy(),
            angle in -360.0f64..360.0,
        ) {
            let before = ant.clone();
            let _ = ant.rotate(angle);
            prop_assert_eq!(ant, before);
        }
    }
}
