//! Tagged bounding boxes anchored to an image.
//!
//! A box is stored as its upper-left corner plus size. The four edges are
//! derived views measured from the matching side of the image:
//!
//! ```text
//!          top
//!        +------------------------+
//!        |   (x,y)                |
//!  left  |     +-----w-----+      |  right
//!        |     h           |      |
//!        |     +-----------+      |
//!        +------------------------+
//!          bottom
//! ```
//!
//! Moving one edge keeps the opposite edge where it is, so `set_top` changes
//! both `y` and `h` while `set_bottom` changes only `h`.
//!
//! Nothing is validated: negative sizes and boxes outside the image are valid
//! values, and bounds checks belong to the caller.

use std::fmt;
use std::sync::Arc;

/// An axis-aligned box tagged with a category name.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    /// Category name, shared between all boxes with the same tag.
    pub tag: Arc<str>,
    /// Upper-left corner X coordinate
    pub x: f64,
    /// Upper-left corner Y coordinate
    pub y: f64,
    /// Width of the box
    pub w: f64,
    /// Height of the box
    pub h: f64,
    image_width: u32,
    image_height: u32,
}

impl BoundingBox {
    pub fn new(
        tag: impl Into<Arc<str>>,
        image_width: u32,
        image_height: u32,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    ) -> Self {
        Self {
            tag: tag.into(),
            x,
            y,
            w,
            h,
            image_width,
            image_height,
        }
    }

    /// Width of the image this box is anchored to.
    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    /// Height of the image this box is anchored to.
    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// Distance from the top of the image.
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Distance from the left of the image.
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Distance from the bottom of the image.
    pub fn bottom(&self) -> f64 {
        self.image_height as f64 - self.y - self.h
    }

    /// Distance from the right of the image.
    pub fn right(&self) -> f64 {
        self.image_width as f64 - self.x - self.w
    }

    /// Move the top edge, keeping the bottom edge fixed.
    pub fn set_top(&mut self, value: f64) {
        let prev_bottom = self.y + self.h;
        self.y = value;
        self.h = prev_bottom - self.y;
    }

    /// Move the left edge, keeping the right edge fixed.
    pub fn set_left(&mut self, value: f64) {
        let prev_right = self.x + self.w;
        self.x = value;
        self.w = prev_right - self.x;
    }

    /// Move the bottom edge, keeping the top edge fixed.
    pub fn set_bottom(&mut self, value: f64) {
        self.h = self.image_height as f64 - value - self.y;
    }

    /// Move the right edge, keeping the left edge fixed.
    pub fn set_right(&mut self, value: f64) {
        self.w = self.image_width as f64 - value - self.x;
    }

    pub fn with_top(mut self, value: f64) -> Self {
        self.set_top(value);
        self
    }

    pub fn with_left(mut self, value: f64) -> Self {
        self.set_left(value);
        self
    }

    pub fn with_bottom(mut self, value: f64) -> Self {
        self.set_bottom(value);
        self
    }

    pub fn with_right(mut self, value: f64) -> Self {
        self.set_right(value);
        self
    }

    /// The four corners: left-top, left-bottom, right-top, right-bottom.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let (x2, y2) = (self.x + self.w, self.y + self.h);
        [(self.x, self.y), (self.x, y2), (x2, self.y), (x2, y2)]
    }

    /// Same geometry re-anchored to an image of a different size.
    pub(crate) fn anchored_to(&self, image_width: u32, image_height: u32) -> Self {
        Self {
            image_width,
            image_height,
            ..self.clone()
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Box {} - x: {}, y: {}, w: {}, h: {}",
            self.tag, self.x, self.y, self.w, self.h
        )
    }
}
