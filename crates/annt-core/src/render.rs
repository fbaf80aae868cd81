//! Overlay rendering of annotations.
//!
//! Produces an `image::RgbImage` with every box drawn on top of the raster as
//! a translucent fill in the tag color plus a solid one-pixel outline. The
//! image is scaled down first so it fits in the requested size.
//!
//! Fill blending:
//! ```text
//! out = alpha * original + (1 - alpha) * tag_color
//! ```

use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::annotation::Annotation;
use crate::color::Rgb;
use crate::transform::InterpolationFilter;

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Pixel data length doesn't match the raster dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },
}

/// Overlay rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Maximum output width in pixels
    pub max_width: u32,
    /// Maximum output height in pixels
    pub max_height: u32,
    /// Weight of the original pixels inside a box (0 = solid color)
    pub alpha: f32,
    /// Filter used when scaling the image down
    pub filter: InterpolationFilter,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_width: 500,
            max_height: 500,
            alpha: 0.5,
            filter: InterpolationFilter::Bilinear,
        }
    }
}

/// Scale factor that fits a `width x height` image into the options' bounds.
///
/// Never above 1: small images are drawn at their own size.
pub fn fit_scale(width: u32, height: u32, options: &RenderOptions) -> f64 {
    if width == 0 || height == 0 {
        return 1.0;
    }
    let rate_w = options.max_width as f64 / width as f64;
    let rate_h = options.max_height as f64 / height as f64;
    rate_w.min(rate_h).min(1.0)
}

/// Render `annotation` with its boxes drawn on top.
///
/// # Errors
///
/// Returns `RenderError::InvalidPixelData` if the raster's pixel buffer does
/// not match its dimensions.
pub fn render_overlay(
    annotation: &Annotation,
    options: &RenderOptions,
) -> Result<RgbImage, RenderError> {
    let raster = &annotation.image;
    let base = raster
        .to_rgb_image()
        .ok_or(RenderError::InvalidPixelData {
            expected: (raster.width as usize) * (raster.height as usize) * 3,
            actual: raster.pixels.len(),
        })?;

    let rate = fit_scale(raster.width, raster.height, options);
    let mut canvas = if rate < 1.0 {
        let new_w = ((raster.width as f64 * rate) as u32).max(1);
        let new_h = ((raster.height as f64 * rate) as u32).max(1);
        image::imageops::resize(&base, new_w, new_h, options.filter.to_image_filter())
    } else {
        base
    };

    log::debug!(
        "rendering {} with {} boxes at scale {:.3}",
        annotation,
        annotation.boxes.len(),
        rate
    );

    let alpha = options.alpha.clamp(0.0, 1.0);
    for b in &annotation.boxes {
        let x1 = (b.x * rate) as i64;
        let y1 = (b.y * rate) as i64;
        let x2 = (b.x * rate + b.w * rate) as i64;
        let y2 = (b.y * rate + b.h * rate) as i64;
        let color = annotation.color_for(&b.tag);

        fill_rect_blended(&mut canvas, (x1, y1), (x2, y2), color, alpha);
        outline_rect(&mut canvas, (x1, y1), (x2, y2), color);
    }

    Ok(canvas)
}

/// Clip the inclusive rectangle `p1..=p2` to the canvas.
fn clip(canvas: &RgbImage, p1: (i64, i64), p2: (i64, i64)) -> Option<(u32, u32, u32, u32)> {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    if p2.0 < p1.0 || p2.1 < p1.1 || w == 0 || h == 0 {
        return None;
    }
    if p2.0 < 0 || p2.1 < 0 || p1.0 >= w || p1.1 >= h {
        return None;
    }
    Some((
        p1.0.max(0) as u32,
        p1.1.max(0) as u32,
        p2.0.min(w - 1) as u32,
        p2.1.min(h - 1) as u32,
    ))
}

fn fill_rect_blended(canvas: &mut RgbImage, p1: (i64, i64), p2: (i64, i64), color: Rgb, alpha: f32) {
    let Some((x1, y1, x2, y2)) = clip(canvas, p1, p2) else {
        return;
    };
    let color = color.to_array();

    for y in y1..=y2 {
        for x in x1..=x2 {
            let pixel = canvas.get_pixel_mut(x, y);
            for (channel, &c) in pixel.0.iter_mut().zip(&color) {
                let v = alpha * *channel as f32 + (1.0 - alpha) * c as f32;
                *channel = v.clamp(0.0, 255.0).round() as u8;
            }
        }
    }
}

fn outline_rect(canvas: &mut RgbImage, p1: (i64, i64), p2: (i64, i64), color: Rgb) {
    let Some((x1, y1, x2, y2)) = clip(canvas, p1, p2) else {
        return;
    };
    let pixel = image::Rgb::from(color);

    // Edges outside the canvas are skipped, visible ones span the clipped range
    for y in [p1.1, p2.1] {
        if y == y1 as i64 || y == y2 as i64 {
            for x in x1..=x2 {
                canvas.put_pixel(x, y as u32, pixel);
            }
        }
    }
    for x in [p1.0, p2.0] {
        if x == x1 as i64 || x == x2 as i64 {
            for y in y1..=y2 {
                canvas.put_pixel(x as u32, y, pixel);
            }
        }
    }
}
