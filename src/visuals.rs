//! Colors and palettes for the particle field.
//!
//! Colors are straight (non-premultiplied) RGBA with channels in `0.0..=1.0`.
//! Constructors take the familiar 8-bit channel values plus a float alpha,
//! so `Rgba::rgba(139, 92, 246, 0.5)` reads the same as its CSS counterpart.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A straight-alpha color.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    /// Create a color from normalized channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from 8-bit channels and a normalized alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }

    /// Same color with a different alpha.
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Whether every channel lies in `0.0..=1.0`.
    pub fn is_normalized(&self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::TRANSPARENT
    }
}

/// The three-entry particle palette.
///
/// Each particle picks one entry uniformly at creation time and keeps it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Palette(pub [Rgba; 3]);

impl Palette {
    /// Purple, blue and green at the given alpha.
    pub const fn dashboard(alpha: f32) -> Self {
        Palette([
            Rgba::rgba(139, 92, 246, alpha), // purple
            Rgba::rgba(14, 165, 233, alpha), // blue
            Rgba::rgba(16, 185, 129, alpha), // green
        ])
    }

    /// The palette entries.
    pub fn colors(&self) -> &[Rgba; 3] {
        &self.0
    }

    /// Pick one entry uniformly.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Rgba {
        self.0[rng.gen_range(0..self.0.len())]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::dashboard(0.5)
    }
}

/// Dark slate used for the trail overlay.
pub const TRAIL_SLATE: (u8, u8, u8) = (17, 24, 39);

/// Slightly bluer slate used by the sparser tunings.
pub const TRAIL_NAVY: (u8, u8, u8) = (15, 23, 42);
