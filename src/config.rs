//! Tunable parameters for the particle field.
//!
//! Three tunings of the same design are shipped as [`Preset`]s. Any of them can
//! be adjusted with the `with_*` setters or loaded from JSON:
//!
//! ```ignore
//! use particle_field::prelude::*;
//!
//! let config = FieldConfig::from(Preset::Balanced)
//!     .with_density_divisor(25.0)
//!     .with_connection_distance(90.0);
//! config.validate()?;
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::visuals::{Palette, Rgba, TRAIL_NAVY, TRAIL_SLATE};

/// How connected pairs are found each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionIndex {
    /// Check every unordered pair.
    #[default]
    Pairwise,
    /// Bucket particles into a uniform grid with cell size equal to the
    /// connection distance. Yields the same pairs in the same order.
    Grid,
}

/// Full set of field parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Surface width per particle. Larger values give a sparser field.
    pub density_divisor: f32,
    /// Particle radius is sampled uniformly from `[min, max)`.
    pub radius_range: (f32, f32),
    /// Velocity components are sampled uniformly from `[-speed, speed]`.
    pub speed: f32,
    pub palette: Palette,
    /// Overlay painted every frame instead of clearing.
    pub trail: Rgba,
    /// Pairs closer than this (strictly) are connected.
    pub connection_distance: f32,
    /// Line alpha at distance zero; fades linearly to zero at the threshold.
    pub connection_alpha: f32,
    pub connection_width: f32,
    /// Line color. Its alpha is replaced by the distance-scaled alpha.
    pub connection_color: Rgba,
    pub connection_index: ConnectionIndex,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Preset::Dense.into()
    }
}

impl FieldConfig {
    pub fn with_density_divisor(mut self, divisor: f32) -> Self {
        self.density_divisor = divisor;
        self
    }

    pub fn with_radius_range(mut self, min: f32, max: f32) -> Self {
        self.radius_range = (min, max);
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_trail(mut self, trail: Rgba) -> Self {
        self.trail = trail;
        self
    }

    pub fn with_connection_distance(mut self, distance: f32) -> Self {
        self.connection_distance = distance;
        self
    }

    pub fn with_connection_alpha(mut self, alpha: f32) -> Self {
        self.connection_alpha = alpha;
        self
    }

    pub fn with_connection_width(mut self, width: f32) -> Self {
        self.connection_width = width;
        self
    }

    pub fn with_connection_index(mut self, index: ConnectionIndex) -> Self {
        self.connection_index = index;
        self
    }

    /// Number of particles for a surface of the given width.
    ///
    /// `floor(width / density_divisor)`, or 0 for a zero, negative or
    /// non-finite width.
    pub fn particle_count(&self, width: f32) -> usize {
        if !width.is_finite() || width <= 0.0 {
            return 0;
        }
        (width / self.density_divisor).floor() as usize
    }

    /// Check every parameter for a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if !self.density_divisor.is_finite() || self.density_divisor <= 0.0 {
            return invalid("density_divisor must be a positive finite number");
        }
        let (min, max) = self.radius_range;
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || min >= max {
            return invalid("radius_range must satisfy 0 < min < max");
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return invalid("speed must be a non-negative finite number");
        }
        if !self.connection_distance.is_finite() || self.connection_distance <= 0.0 {
            return invalid("connection_distance must be a positive finite number");
        }
        if !(0.0..=1.0).contains(&self.connection_alpha) {
            return invalid("connection_alpha must lie in [0, 1]");
        }
        if !self.connection_width.is_finite() || self.connection_width <= 0.0 {
            return invalid("connection_width must be a positive finite number");
        }
        if !self.trail.is_normalized() || !self.connection_color.is_normalized() {
            return invalid("colors must have channels in [0, 1]");
        }
        if !self.palette.colors().iter().all(Rgba::is_normalized) {
            return invalid("palette colors must have channels in [0, 1]");
        }
        Ok(())
    }

    /// Parse a JSON document. Missing fields take their `Dense` values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: FieldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// The recorded tunings, densest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// One particle per 15px, long connections, slow-fading trail.
    #[default]
    Dense,
    /// One particle per 20px.
    Balanced,
    /// One particle per 30px, short faint connections, quick fade.
    Sparse,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Dense, Preset::Balanced, Preset::Sparse];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Dense => "dense",
            Preset::Balanced => "balanced",
            Preset::Sparse => "sparse",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::Invalid(format!("unknown preset '{s}'")))
    }
}

impl From<Preset> for FieldConfig {
    fn from(preset: Preset) -> Self {
        let (r, g, b) = TRAIL_SLATE;
        let (nr, ng, nb) = TRAIL_NAVY;

        let base = FieldConfig {
            density_divisor: 15.0,
            radius_range: (0.5, 2.5),
            speed: 0.075,
            palette: Palette::dashboard(0.5),
            trail: Rgba::rgba(r, g, b, 0.05),
            connection_distance: 100.0,
            connection_alpha: 0.03,
            connection_width: 0.5,
            connection_color: Rgba::WHITE,
            connection_index: ConnectionIndex::Pairwise,
        };

        match preset {
            Preset::Dense => base,
            Preset::Balanced => FieldConfig {
                density_divisor: 20.0,
                radius_range: (0.5, 2.0),
                speed: 0.06,
                palette: Palette::dashboard(0.4),
                trail: Rgba::rgba(nr, ng, nb, 0.1),
                connection_distance: 80.0,
                connection_alpha: 0.02,
                connection_width: 0.3,
                ..base
            },
            Preset::Sparse => FieldConfig {
                density_divisor: 30.0,
                radius_range: (0.3, 1.5),
                speed: 0.04,
                palette: Palette::dashboard(0.2),
                trail: Rgba::rgba(nr, ng, nb, 0.2),
                connection_distance: 70.0,
                connection_alpha: 0.01,
                connection_width: 0.2,
                ..base
            },
        }
    }
}
