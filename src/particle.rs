//! Particles and their spawning.

use glam::Vec2;
use rand::Rng;

use crate::config::FieldConfig;
use crate::surface::Bounds;
use crate::visuals::Rgba;

/// A moving point rendered as a filled disc.
///
/// Radius and color never change after creation. Velocity only ever flips
/// sign, on reflection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub color: Rgba,
}

impl Particle {
    /// Move by one velocity step, then reflect.
    ///
    /// Reflection looks at the position after the move, so a particle may sit
    /// just outside the bounds for the frame in which it crosses an edge.
    #[inline]
    pub fn advance(&mut self, bounds: Bounds) {
        self.position += self.velocity;

        if self.position.x < 0.0 || self.position.x > bounds.width {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y < 0.0 || self.position.y > bounds.height {
            self.velocity.y = -self.velocity.y;
        }
    }
}

/// Uniform sample in `[lo, hi)`, or `lo` when the range is empty.
#[inline]
fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// Spawn the full particle set for a surface.
///
/// Count is `config.particle_count(bounds.width)`. Positions are uniform
/// within the bounds; velocity components are uniform in
/// `[-speed, speed]`.
pub fn spawn<R: Rng + ?Sized>(bounds: Bounds, config: &FieldConfig, rng: &mut R) -> Vec<Particle> {
    let count = config.particle_count(bounds.width);
    let (r_min, r_max) = config.radius_range;
    let h = config.speed;
    let height = if bounds.height.is_finite() { bounds.height.max(0.0) } else { 0.0 };

    (0..count)
        .map(|_| Particle {
            position: Vec2::new(uniform(rng, 0.0, bounds.width), uniform(rng, 0.0, height)),
            radius: uniform(rng, r_min, r_max),
            color: config.palette.pick(rng),
            velocity: Vec2::new(
                if h > 0.0 { rng.gen_range(-h..=h) } else { 0.0 },
                if h > 0.0 { rng.gen_range(-h..=h) } else { 0.0 },
            ),
        })
        .collect()
}
