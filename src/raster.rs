//! Software rasterizer implementing [`Surface`].
//!
//! Pixels are 8-bit straight-alpha RGBA, blended source-over. Discs and lines
//! are anti-aliased by distance to the shape edge, sampled at pixel centers.
//! A new or resized canvas is fully transparent, like an HTML canvas after
//! its size is assigned.

use std::convert::Infallible;
use std::path::Path;

use glam::Vec2;

use crate::error::ExportError;
use crate::surface::{Bounds, Surface};
use crate::visuals::Rgba;

/// An RGBA pixel buffer.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

/// Pixel index range `[start, end)` covering `[lo, hi]` on an axis of `len`.
#[inline]
fn span(lo: f32, hi: f32, len: u32) -> (u32, u32) {
    if !(lo.is_finite() && hi.is_finite()) || hi < 0.0 {
        return (0, 0);
    }
    let start = lo.floor().max(0.0) as u32;
    let end = (hi.ceil().max(0.0) as u32).saturating_add(1).min(len);
    (start.min(end), end)
}

#[inline]
fn to_byte(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from((self.width, self.height))
    }

    /// Reallocate to a new size. Contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize, [0; 4]);
    }

    /// Pixel at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    /// Row-major RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            image::Rgba(self.pixels[(y * self.width + x) as usize])
        })
    }

    /// Encode the canvas as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        self.to_image().save(path)?;
        Ok(())
    }

    /// Blend `color` over pixel `(x, y)` with the given coverage.
    #[inline]
    fn blend(&mut self, x: u32, y: u32, color: Rgba, coverage: f32) {
        let sa = (color.a * coverage).clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }

        let idx = (y * self.width + x) as usize;
        let dst = self.pixels[idx];
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);

        let mix = |s: f32, d: u8| (s * sa + (d as f32 / 255.0) * da * (1.0 - sa)) / out_a;

        self.pixels[idx] = [
            to_byte(mix(color.r, dst[0])),
            to_byte(mix(color.g, dst[1])),
            to_byte(mix(color.b, dst[2])),
            to_byte(out_a),
        ];
    }
}

/// Distance from `p` to the segment `a`-`b`.
#[inline]
fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

impl Surface for Canvas {
    type Error = Infallible;

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba) -> Result<(), Infallible> {
        let end = origin + size;
        if !(size.x > 0.0 && size.y > 0.0) {
            return Ok(());
        }
        // Pixels whose centers fall inside the rectangle.
        let x0 = origin.x.round().max(0.0) as u32;
        let y0 = origin.y.round().max(0.0) as u32;
        let x1 = (end.x.round().max(0.0) as u32).min(self.width);
        let y1 = (end.y.round().max(0.0) as u32).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color, 1.0);
            }
        }
        Ok(())
    }

    fn fill_disc(&mut self, center: Vec2, radius: f32, color: Rgba) -> Result<(), Infallible> {
        if !(radius > 0.0) {
            return Ok(());
        }
        let reach = radius + 1.0;
        let (x0, x1) = span(center.x - reach, center.x + reach, self.width);
        let (y0, y1) = span(center.y - reach, center.y + reach, self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (radius + 0.5 - p.distance(center)).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
        Ok(())
    }

    fn stroke_line(
        &mut self,
        from: Vec2,
        to: Vec2,
        color: Rgba,
        width: f32,
    ) -> Result<(), Infallible> {
        if !(width > 0.0) {
            return Ok(());
        }
        let half = width * 0.5;
        let reach = half + 1.0;
        let min = from.min(to) - Vec2::splat(reach);
        let max = from.max(to) + Vec2::splat(reach);
        let (x0, x1) = span(min.x, max.x, self.width);
        let (y0, y1) = span(min.y, max.y, self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = segment_distance(p, from, to);
                // Hairlines spread their width over the nearest pixel.
                let coverage = if width >= 1.0 {
                    (half + 0.5 - d).clamp(0.0, 1.0)
                } else {
                    width * (1.0 - d).clamp(0.0, 1.0)
                };
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
        Ok(())
    }
}
