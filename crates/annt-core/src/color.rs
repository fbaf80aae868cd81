//! Per-tag color assignment.
//!
//! Every tag declared in a dataset carries an integer color index. The index is
//! spread around the hue circle and converted to RGB at a fixed saturation and
//! value, so that tags drawn next to each other stay distinguishable.
//!
//! # Algorithm
//!
//! Hues are assigned with the golden angle (≈137.5°): each new index lands in
//! the largest remaining gap of the circle, so any prefix of indices is
//! well spread without knowing how many tags exist in total.
//!
//! HSV to RGB uses the sector method:
//! ```text
//! c  = v * s
//! h' = h / 60
//! x  = c * (1 - |h' mod 2 - 1|)
//! (r', g', b') = sector_table[floor(h')]
//! channel = round((v - c + channel') * 255)
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The golden angle in degrees, `360 * (2 - φ)`.
const GOLDEN_ANGLE_DEGREES: f64 = 137.507_764_050_037_85;

/// Mapping from tag name to its display color.
pub type ColorMap = HashMap<String, Rgb>;

/// Errors produced by color conversion.
#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    /// Saturation or value outside `[0, 1]`.
    #[error("{name} must be between 0 and 1, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels in RGB order.
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Channels in the blue-green-red order expected by BGR display backends.
    ///
    /// Colors are stored as RGB everywhere in this crate; call this only when
    /// handing a color to a consumer that reads channels in BGR order.
    pub fn to_display_channel_order(self) -> [u8; 3] {
        [self.b, self.g, self.r]
    }
}

impl From<Rgb> for image::Rgb<u8> {
    fn from(c: Rgb) -> Self {
        image::Rgb(c.to_array())
    }
}

/// Saturation and value used when turning color indices into colors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    /// Saturation (0 to 1)
    pub saturation: f64,
    /// Value / brightness (0 to 1)
    pub value: f64,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            saturation: 1.0,
            value: 0.7,
        }
    }
}

impl ColorScheme {
    /// Color for a single color index.
    pub fn color_for(&self, index: u32) -> Result<Rgb, ColorError> {
        hsv_to_rgb(index_to_hue(index), self.saturation, self.value)
    }
}

/// Map a color index to a hue in `[0, 360)`.
///
/// Pure function of `index`: the same index yields the same hue in every run.
pub fn index_to_hue(index: u32) -> f64 {
    (index as f64 * GOLDEN_ANGLE_DEGREES).rem_euclid(360.0)
}

/// Convert an HSV color to 8-bit RGB.
///
/// # Arguments
///
/// * `h` - Hue in degrees (0 to 360)
/// * `s` - Saturation (0 to 1)
/// * `v` - Value (0 to 1)
///
/// # Errors
///
/// Returns `ColorError::InvalidParameter` when `s` or `v` is outside `[0, 1]`.
///
/// Hues outside `[0, 360)`, NaN included, are not an error; they fall outside
/// the sector table and produce the gray level `v - c`.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Result<Rgb, ColorError> {
    if !(0.0..=1.0).contains(&s) {
        return Err(ColorError::InvalidParameter {
            name: "saturation",
            value: s,
        });
    }
    if !(0.0..=1.0).contains(&v) {
        return Err(ColorError::InvalidParameter {
            name: "value",
            value: v,
        });
    }

    let c = v * s;
    let h_dash = h / 60.0;
    let x = c * (1.0 - (h_dash.rem_euclid(2.0) - 1.0).abs());

    // Non-finite hues have no sector
    let sector = if h_dash.is_finite() { h_dash.floor() as i64 } else { -1 };
    let (r, g, b) = match sector {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        5 => (c, 0.0, x),
        _ => (0.0, 0.0, 0.0),
    };

    let m = v - c;
    let channel = |component: f64| ((m + component) * 255.0).round() as u8;
    Ok(Rgb::new(channel(r), channel(g), channel(b)))
}

/// Build the tag → color map for a set of `(tag name, color index)` pairs.
///
/// A tag declared twice keeps the color of its last declaration.
pub fn build_color_map<'a, I>(tags: I, scheme: &ColorScheme) -> Result<ColorMap, ColorError>
where
    I: IntoIterator<Item = (&'a str, u32)>,
{
    let mut map = ColorMap::new();
    for (name, index) in tags {
        map.insert(name.to_string(), scheme.color_for(index)?);
    }
    Ok(map)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: Valid inputs always convert.
        #[test]
        fn prop_valid_input_converts(
            h in 0.0f64..360.0,
            s in 0.0f64..=1.0,
            v in 0.0f64..=1.0,
        ) {
            prop_assert!(hsv_to_rgb(h, s, v).is_ok());
        }

        /// Property: The largest channel equals the value.
        #[test]
        fn prop_max_channel_is_value(
            h in 0.0f64..360.0,
            s in 0.0f64..=1.0,
            v in 0.0f64..=1.0,
        ) {
            let c = hsv_to_rgb(h, s, v).unwrap();
            let max = c.r.max(c.g).max(c.b);
            let expected = (v * 255.0).round() as i32;
            prop_assert!((max as i32 - expected).abs() <= 1, "max {} vs {}", max, expected);
        }

        /// Property: Hue assignment is deterministic and in range.
        #[test]
        fn prop_hue_in_range(index in any::<u32>()) {
            let hue = index_to_hue(index);
            prop_assert!((0.0..360.0).contains(&hue));
            prop_assert_eq!(hue, index_to_hue(index));
        }

        /// Property: Distinct small indices get distinct hues.
        #[test]
        fn prop_distinct_indices_distinct_hues(a in 0u32..1000, b in 0u32..1000) {
            prop_assume!(a != b);
            prop_assert!((index_to_hue(a) - index_to_hue(b)).abs() > 1e-6);
        }
    }
}
