//! Frame timing for hosts.
//!
//! The field itself advances by a fixed step per frame and ignores wall
//! time. Hosts use [`Time`] to report FPS and [`FRAME_BUDGET`] to flag slow
//! frames.
//!
//! # Example
//!
//! ```ignore
//! use particle_field::time::Time;
//!
//! let mut time = Time::new();
//!
//! // Once per presented frame:
//! if time.update() {
//!     window.set_title(&format!("{:.0} fps", time.fps()));
//! }
//! ```

use std::time::{Duration, Instant};

/// Budget for one frame at 60 Hz.
pub const FRAME_BUDGET: Duration = Duration::from_micros(16_667);

/// Time tracking for the presentation loop.
#[derive(Debug)]
pub struct Time {
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
}

impl Time {
    /// Create a new time tracker starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Update timing values. Call once per frame.
    ///
    /// Returns `true` when the FPS value was refreshed.
    pub fn update(&mut self) -> bool {
        let now = Instant::now();
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
            return true;
        }
        false
    }

    /// Total number of frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Current frames per second (updated every 500ms).
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
