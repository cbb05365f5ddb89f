//! The drawable surface the field renders into.
//!
//! A surface only needs three primitives: a filled rectangle (the trail
//! overlay), a filled disc (a particle) and a stroked line (a connection).
//! The software [`Canvas`](crate::Canvas) implements it; tests substitute a
//! recorder.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::visuals::Rgba;

/// Width and height of the drawable area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether `p` lies inside the closed rectangle `[0, width] x [0, height]`.
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

impl From<(u32, u32)> for Bounds {
    fn from((width, height): (u32, u32)) -> Self {
        Bounds::new(width as f32, height as f32)
    }
}

/// Drawing primitives used by the per-frame step.
///
/// Every primitive blends over the existing contents; nothing clears.
pub trait Surface {
    /// Error raised by a failing draw call.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fill the axis-aligned rectangle at `origin` with extent `size`.
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba) -> Result<(), Self::Error>;

    /// Fill a disc.
    fn fill_disc(&mut self, center: Vec2, radius: f32, color: Rgba) -> Result<(), Self::Error>;

    /// Stroke a straight line of the given width.
    fn stroke_line(
        &mut self,
        from: Vec2,
        to: Vec2,
        color: Rgba,
        width: f32,
    ) -> Result<(), Self::Error>;
}
