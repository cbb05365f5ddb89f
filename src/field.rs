//! The particle field simulation and its per-frame step.
//!
//! A [`ParticleField`] owns the particles, the current bounds and the
//! parameters. It knows nothing about scheduling; the
//! [`Animator`](crate::Animator) decides when to step it.

use glam::Vec2;
use rand::Rng;

use crate::config::FieldConfig;
use crate::connections::{Connection, ConnectionFinder};
use crate::error::ConfigError;
use crate::particle::{self, Particle};
use crate::surface::{Bounds, Surface};

/// Counts reported by one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// 1-based index of the step within the field's lifetime.
    pub frame: u64,
    pub particles: usize,
    pub connections: usize,
}

/// A set of moving particles within resizable bounds.
#[derive(Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    bounds: Bounds,
    config: FieldConfig,
    finder: ConnectionFinder,
    positions: Vec<Vec2>,
    connections: Vec<Connection>,
    frame: u64,
}

impl ParticleField {
    /// Validate `config` and spawn `floor(width / density_divisor)` particles.
    pub fn new<R: Rng + ?Sized>(
        bounds: Bounds,
        config: FieldConfig,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let particles = particle::spawn(bounds, &config, rng);
        Ok(Self::with_particles(bounds, config, particles))
    }

    /// Build a field from an explicit particle set. `config` is not validated.
    pub fn with_particles(bounds: Bounds, config: FieldConfig, particles: Vec<Particle>) -> Self {
        let finder = ConnectionFinder::new(config.connection_index);
        Self {
            positions: Vec::with_capacity(particles.len()),
            particles,
            bounds,
            config,
            finder,
            connections: Vec::new(),
            frame: 0,
        }
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Number of steps taken so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Connections found by the most recent step.
    pub fn last_connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Adopt new bounds. Particles keep their position and velocity; any that
    /// are now outside get reflected back by subsequent steps.
    pub fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// Move every particle one step and reflect at the bounds.
    pub fn advance(&mut self) {
        let bounds = self.bounds;
        for p in &mut self.particles {
            p.advance(bounds);
        }
    }

    /// Find connected pairs for the current positions.
    pub fn find_connections(&mut self) -> &[Connection] {
        self.positions.clear();
        self.positions.extend(self.particles.iter().map(|p| p.position));
        self.finder.find(
            &self.positions,
            self.config.connection_distance,
            &mut self.connections,
        );
        &self.connections
    }

    /// Run one frame: trail overlay, move, draw particles, draw connections.
    ///
    /// Stops at the first failing draw call; the particles will have moved
    /// already when a disc or line fails.
    pub fn step<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<FrameStats, S::Error> {
        surface.fill_rect(Vec2::ZERO, self.bounds.size(), self.config.trail)?;

        self.advance();
        self.frame += 1;

        for p in &self.particles {
            surface.fill_disc(p.position, p.radius, p.color)?;
        }

        self.find_connections();

        let threshold = self.config.connection_distance;
        let base = self.config.connection_color;
        for c in &self.connections {
            let alpha = self.config.connection_alpha * c.strength(threshold);
            surface.stroke_line(
                self.particles[c.a].position,
                self.particles[c.b].position,
                base.with_alpha(alpha),
                self.config.connection_width,
            )?;
        }

        Ok(FrameStats {
            frame: self.frame,
            particles: self.particles.len(),
            connections: self.connections.len(),
        })
    }
}
