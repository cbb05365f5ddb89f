//! # particle-field
//!
//! An ambient particle-field animation: slow drifting dots that bounce off the
//! edges of the viewport, faint lines between close neighbours, and a trail
//! left by painting a translucent overlay every frame instead of clearing.
//!
//! ## Quick Start
//!
//! ```ignore
//! use particle_field::prelude::*;
//! use rand::{rngs::SmallRng, SeedableRng};
//!
//! let config = FieldConfig::from(Preset::Balanced);
//! let viewport = FixedViewport::new(Bounds::new(1280.0, 720.0));
//! let mut animator = Animator::new(
//!     Some(Canvas::new(1280, 720)),
//!     viewport,
//!     ManualScheduler::new(),
//!     config,
//!     &mut SmallRng::seed_from_u64(7),
//! )?;
//!
//! animator.start()?;
//! for _ in 0..60 {
//!     let request = animator.scheduler_mut().take_due().unwrap();
//!     animator.on_frame(request)?;
//! }
//! animator.stop();
//! ```
//!
//! ## Core Concepts
//!
//! ### Field
//!
//! A [`ParticleField`] holds `floor(width / density_divisor)` particles with
//! random position, radius, palette color and a small velocity. Each step
//! paints the trail overlay, moves every particle and reflects it at the
//! bounds, draws the particles, then connects every pair closer than the
//! connection distance.
//!
//! ### Animator
//!
//! An [`Animator`] ties a field to a host. It subscribes to viewport resizes
//! and keeps exactly one frame request outstanding while running. Stopping,
//! dropping, or a failing draw call releases both.
//!
//! ### Hosts
//!
//! Hosts implement [`Viewport`] and [`FrameScheduler`]. [`ManualScheduler`]
//! and [`FixedViewport`] are pumped by hand for offscreen rendering and tests;
//! [`run_window`] opens a native window and presents through the GPU.
//!
//! ## Presets
//!
//! | Preset | Divisor | Radius | Speed | Link distance | Link alpha | Trail alpha |
//! |--------|---------|--------|-------|---------------|------------|-------------|
//! | [`Preset::Dense`] | 15 | 0.5–2.5 | 0.075 | 100 | 0.03 | 0.05 |
//! | [`Preset::Balanced`] | 20 | 0.5–2.0 | 0.06 | 80 | 0.02 | 0.1 |
//! | [`Preset::Sparse`] | 30 | 0.3–1.5 | 0.04 | 70 | 0.01 | 0.2 |

pub mod animator;
pub mod config;
pub mod connections;
pub mod error;
pub mod field;
mod gpu;
pub mod headless;
pub mod host;
pub mod particle;
pub mod raster;
pub mod surface;
pub mod time;
pub mod visuals;
mod window;

pub use animator::{Animator, AnimatorState};
pub use config::{ConnectionIndex, FieldConfig, Preset};
pub use connections::{Connection, ConnectionFinder};
pub use error::{AnimatorError, ConfigError, ExportError, GpuError, RunError};
pub use field::{FrameStats, ParticleField};
pub use glam::Vec2;
pub use headless::{render_headless, HeadlessOptions, HeadlessRun};
pub use host::{FixedViewport, FrameRequest, FrameScheduler, ManualScheduler, ResizeListener, Viewport};
pub use particle::Particle;
pub use raster::Canvas;
pub use surface::{Bounds, Surface};
pub use visuals::{Palette, Rgba};
pub use window::{run_window, RedrawScheduler, WindowViewport};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use particle_field::prelude::*;
/// ```
pub mod prelude {
    pub use crate::animator::{Animator, AnimatorState};
    pub use crate::config::{ConnectionIndex, FieldConfig, Preset};
    pub use crate::field::{FrameStats, ParticleField};
    pub use crate::host::{FixedViewport, FrameScheduler, ManualScheduler, Viewport};
    pub use crate::raster::Canvas;
    pub use crate::surface::{Bounds, Surface};
    pub use crate::visuals::{Palette, Rgba};
    pub use crate::Vec2;
}
