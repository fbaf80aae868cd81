//! Raster resampling through an affine transform.
//!
//! The warp uses inverse mapping: for each pixel in the output canvas we map
//! back into the source with the inverted matrix and interpolate the source
//! pixels around that point.
//! - **Bilinear**: 2x2 neighborhood, fast
//! - **Lanczos3**: 6x6 neighborhood, sharper edges
//!
//! Output pixels whose source position falls outside the source image are
//! black.

use serde::{Deserialize, Serialize};

use super::Affine2;
use crate::raster::Raster;

/// Slack allowed past the last row or column before a sample counts as outside.
const EDGE_EPSILON: f64 = 1e-9;

/// Interpolation filter for warp operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationFilter {
    /// Fast bilinear interpolation.
    #[default]
    Bilinear,
    /// High-quality Lanczos3 interpolation.
    Lanczos3,
}

impl InterpolationFilter {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            InterpolationFilter::Bilinear => image::imageops::FilterType::Triangle,
            InterpolationFilter::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Warp `image` through `transform` into a `width x height` canvas.
///
/// `transform` maps source coordinates to destination coordinates. A singular
/// transform has no source for any output pixel and yields a black canvas, as
/// does a source whose pixel buffer does not match its dimensions.
pub fn warp_affine(
    image: &Raster,
    transform: &Affine2,
    width: u32,
    height: u32,
    filter: InterpolationFilter,
) -> Raster {
    let mut output = Raster::blank(width, height);

    let Some(inverse) = transform.inverse() else {
        log::warn!("singular warp transform {:?}, output left black", transform.m);
        return output;
    };
    if image.is_empty() {
        return output;
    }
    let expected = (image.width as usize) * (image.height as usize) * 3;
    if image.pixels.len() != expected {
        log::warn!(
            "warp source has {} bytes, expected {expected}, output left black",
            image.pixels.len()
        );
        return output;
    }

    for dst_y in 0..height {
        for dst_x in 0..width {
            let (src_x, src_y) = inverse.apply((dst_x as f64, dst_y as f64));

            let pixel = match filter {
                InterpolationFilter::Bilinear => sample_bilinear(image, src_x, src_y),
                InterpolationFilter::Lanczos3 => sample_lanczos3(image, src_x, src_y),
            };

            let dst_idx = ((dst_y as usize) * (width as usize) + dst_x as usize) * 3;
            output.pixels[dst_idx..dst_idx + 3].copy_from_slice(&pixel);
        }
    }

    output
}

/// Get a pixel as [f64; 3] from an image at the given coordinates.
#[inline]
fn get_pixel_f64(image: &Raster, px: usize, py: usize) -> [f64; 3] {
    let idx = (py * image.width as usize + px) * 3;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
    ]
}

/// Sample a pixel using bilinear interpolation.
///
/// Positions exactly on the last row or column sample that row or column
/// directly, so an identity warp reproduces the source.
fn sample_bilinear(image: &Raster, x: f64, y: f64) -> [u8; 3] {
    let (max_x, max_y) = ((image.width - 1) as f64, (image.height - 1) as f64);

    if !(-EDGE_EPSILON..=max_x + EDGE_EPSILON).contains(&x)
        || !(-EDGE_EPSILON..=max_y + EDGE_EPSILON).contains(&y)
    {
        return [0, 0, 0];
    }
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(image.width as usize - 1);
    let y1 = (y0 + 1).min(image.height as usize - 1);

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x1, y0);
    let p01 = get_pixel_f64(image, x0, y1);
    let p11 = get_pixel_f64(image, x1, y1);

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    result
}

/// Sample a pixel using Lanczos3 interpolation.
///
/// Falls back to bilinear within the kernel radius of the border.
fn sample_lanczos3(image: &Raster, x: f64, y: f64) -> [u8; 3] {
    let (w, h) = (image.width as i64, image.height as i64);

    if x < 2.0 || x >= (w - 3) as f64 || y < 2.0 || y >= (h - 3) as f64 {
        return sample_bilinear(image, x, y);
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 3];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;

            if px >= 0 && px < w && py >= 0 && py < h {
                let weight = lanczos_weight(x - px as f64, 3.0) * lanczos_weight(y - py as f64, 3.0);

                let pixel = get_pixel_f64(image, px as usize, py as usize);
                for i in 0..3 {
                    sum[i] += pixel[i] * weight;
                }
                weight_sum += weight;
            }
        }
    }

    let mut result = [0u8; 3];
    if weight_sum > 0.0 {
        for i in 0..3 {
            result[i] = (sum[i] / weight_sum).clamp(0.0, 255.0).round() as u8;
        }
    }

    result
}

/// Lanczos kernel weight function.
///
/// ```text
/// L(x) = sinc(x) * sinc(x/a)  for |x| < a
/// L(x) = 0                     for |x| >= a
/// ```
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;

    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}
