//! Lifecycle of a running particle field.
//!
//! An [`Animator`] moves through three states:
//!
//! ```text
//! Idle --start--> Running --stop / surface error / drop--> Stopped
//!   \________________________stop_________________________/
//! ```
//!
//! While running it holds a lease on its host: one resize subscription and
//! at most one outstanding frame request. Every exit from `Running` releases
//! both, so once `stop` returns no frame or resize event reaches the field.
//!
//! ```ignore
//! let mut animator = Animator::new(Some(canvas), viewport, scheduler, config, &mut rng)?;
//! animator.start()?;
//! while let Some(request) = animator.scheduler_mut().take_due() {
//!     animator.on_frame(request)?;
//! }
//! ```

use rand::Rng;

use crate::config::FieldConfig;
use crate::error::{AnimatorError, ConfigError};
use crate::field::{FrameStats, ParticleField};
use crate::host::{FrameRequest, FrameScheduler, ResizeListener, Viewport};
use crate::surface::{Bounds, Surface};

/// Where an animator is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimatorState {
    /// Created, not yet started.
    Idle,
    /// Subscribed to resizes with a frame scheduled.
    Running,
    /// Finished. Cannot be restarted.
    Stopped,
}

#[derive(Debug)]
struct Lease {
    listener: ResizeListener,
    frame: Option<FrameRequest>,
}

/// Drives a [`ParticleField`] from host frame and resize callbacks.
pub struct Animator<S: Surface, V: Viewport, F: FrameScheduler> {
    field: ParticleField,
    surface: Option<S>,
    viewport: V,
    scheduler: F,
    state: AnimatorState,
    lease: Option<Lease>,
}

impl<S: Surface, V: Viewport, F: FrameScheduler> Animator<S, V, F> {
    /// Create an animator sized to the viewport's current bounds.
    ///
    /// Without a surface the animator is inert: it spawns no particles and
    /// `start` quietly does nothing.
    pub fn new<R: Rng + ?Sized>(
        surface: Option<S>,
        viewport: V,
        scheduler: F,
        config: FieldConfig,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let bounds = viewport.bounds();
        let field = if surface.is_some() {
            ParticleField::new(bounds, config, rng)?
        } else {
            config.validate()?;
            log::debug!("no drawable surface; particle field stays inert");
            ParticleField::with_particles(bounds, config, Vec::new())
        };

        Ok(Self {
            field,
            surface,
            viewport,
            scheduler,
            state: AnimatorState::Idle,
            lease: None,
        })
    }

    /// Like [`Animator::new`], but a missing surface is an error.
    pub fn try_new<R: Rng + ?Sized>(
        surface: Option<S>,
        viewport: V,
        scheduler: F,
        config: FieldConfig,
        rng: &mut R,
    ) -> Result<Self, AnimatorError> {
        if surface.is_none() {
            return Err(AnimatorError::SurfaceUnavailable);
        }
        Ok(Self::new(surface, viewport, scheduler, config, rng)?)
    }

    /// Subscribe to resizes and schedule the first frame.
    ///
    /// Starting a running animator is a no-op. Starting an inert one succeeds
    /// without doing anything.
    pub fn start(&mut self) -> Result<(), AnimatorError> {
        match self.state {
            AnimatorState::Running => return Ok(()),
            AnimatorState::Stopped => return Err(AnimatorError::AlreadyStopped),
            AnimatorState::Idle => {}
        }
        if self.surface.is_none() {
            return Ok(());
        }

        let listener = self.viewport.subscribe_resize();
        // Resizes before subscribing had no listener to reach.
        self.field.resize(self.viewport.bounds());
        let frame = self.scheduler.request_frame();
        self.lease = Some(Lease {
            listener,
            frame: Some(frame),
        });
        self.state = AnimatorState::Running;

        let bounds = self.field.bounds();
        log::info!(
            "particle field started: {} particles on {}x{}",
            self.field.len(),
            bounds.width,
            bounds.height
        );
        Ok(())
    }

    /// Handle a fired frame request.
    ///
    /// Runs one step and schedules the next frame. Requests other than the
    /// one currently outstanding are ignored and return `Ok(None)`.
    ///
    /// If the surface fails the animator releases its lease, moves to
    /// [`AnimatorState::Stopped`] and returns the error.
    pub fn on_frame(&mut self, request: FrameRequest) -> Result<Option<FrameStats>, AnimatorError> {
        if self.state != AnimatorState::Running {
            return Ok(None);
        }
        let Some(lease) = self.lease.as_mut() else {
            return Ok(None);
        };
        if lease.frame != Some(request) {
            log::trace!("ignoring stale frame request {:?}", request);
            return Ok(None);
        }
        lease.frame = None;

        let Some(surface) = self.surface.as_mut() else {
            return Ok(None);
        };

        match self.field.step(surface) {
            Ok(stats) => {
                let next = self.scheduler.request_frame();
                if let Some(lease) = self.lease.as_mut() {
                    lease.frame = Some(next);
                }
                Ok(Some(stats))
            }
            Err(e) => {
                log::warn!("frame {} failed, stopping animation: {}", self.field.frame(), e);
                self.release();
                self.state = AnimatorState::Stopped;
                Err(AnimatorError::Surface(Box::new(e)))
            }
        }
    }

    /// Handle a resize notification. Returns whether it was applied.
    ///
    /// Only the bounds change; particles keep their state.
    pub fn on_resize(&mut self, listener: ResizeListener, bounds: Bounds) -> bool {
        let subscribed = self.state == AnimatorState::Running
            && self.lease.as_ref().is_some_and(|l| l.listener == listener);
        if !subscribed {
            return false;
        }
        log::debug!("particle field resized to {}x{}", bounds.width, bounds.height);
        self.field.resize(bounds);
        true
    }

    /// Cancel the pending frame and unsubscribe from resizes.
    ///
    /// Idempotent. After it returns no frame or resize reaches the field.
    pub fn stop(&mut self) {
        match self.state {
            AnimatorState::Stopped => {}
            AnimatorState::Idle => self.state = AnimatorState::Stopped,
            AnimatorState::Running => {
                self.release();
                self.state = AnimatorState::Stopped;
                log::info!("particle field stopped after {} frames", self.field.frame());
            }
        }
    }

    fn release(&mut self) {
        if let Some(lease) = self.lease.take() {
            if let Some(frame) = lease.frame {
                self.scheduler.cancel_frame(frame);
            }
            self.viewport.unsubscribe_resize(lease.listener);
        }
    }

    #[inline]
    pub fn state(&self) -> AnimatorState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == AnimatorState::Running
    }

    /// Whether the animator was created without a surface.
    #[inline]
    pub fn is_inert(&self) -> bool {
        self.surface.is_none()
    }

    /// The frame request currently outstanding, if any.
    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.lease.as_ref().and_then(|l| l.frame)
    }

    /// The active resize subscription, if any.
    pub fn resize_listener(&self) -> Option<ResizeListener> {
        self.lease.as_ref().map(|l| l.listener)
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }
}

impl<S: Surface, V: Viewport, F: FrameScheduler> Drop for Animator<S, V, F> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FixedViewport, ManualScheduler};
    use crate::raster::Canvas;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    type TestAnimator = Animator<Canvas, FixedViewport, ManualScheduler>;

    fn animator(surface: bool) -> TestAnimator {
        let bounds = Bounds::new(300.0, 200.0);
        let canvas = surface.then(|| Canvas::new(300, 200));
        Animator::new(
            canvas,
            FixedViewport::new(bounds),
            ManualScheduler::new(),
            FieldConfig::default(),
            &mut SmallRng::seed_from_u64(8),
        )
        .unwrap()
    }

    #[test]
    fn test_start_subscribes_and_schedules() {
        let mut a = animator(true);
        assert_eq!(a.state(), AnimatorState::Idle);

        a.start().unwrap();

        assert!(a.is_running());
        assert_eq!(a.viewport().listeners().len(), 1);
        assert_eq!(a.scheduler().pending(), 1);
        assert_eq!(a.field().len(), 20);
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut a = animator(true);
        a.start().unwrap();
        a.start().unwrap();
        assert_eq!(a.scheduler().requested(), 1);
    }

    #[test]
    fn test_frame_rearms() {
        let mut a = animator(true);
        a.start().unwrap();

        for expected in 1..=3 {
            let req = a.scheduler_mut().take_due().unwrap();
            let stats = a.on_frame(req).unwrap().unwrap();
            assert_eq!(stats.frame, expected);
            assert_eq!(a.pending_frame(), Some(FrameRequest(expected + 1)));
        }
    }

    #[test]
    fn test_stale_request_ignored() {
        let mut a = animator(true);
        a.start().unwrap();
        let req = a.scheduler_mut().take_due().unwrap();
        a.on_frame(req).unwrap();

        assert_eq!(a.on_frame(req).unwrap(), None);
        assert_eq!(a.field().frame(), 1);
    }

    #[test]
    fn test_inert_without_surface() {
        let mut a = animator(false);
        assert!(a.is_inert());
        assert!(a.field().is_empty());

        a.start().unwrap();

        assert_eq!(a.state(), AnimatorState::Idle);
        assert_eq!(a.scheduler().requested(), 0);
        assert!(a.viewport().listeners().is_empty());
    }

    #[test]
    fn test_try_new_requires_surface() {
        let result = TestAnimator::try_new(
            None,
            FixedViewport::new(Bounds::new(10.0, 10.0)),
            ManualScheduler::new(),
            FieldConfig::default(),
            &mut SmallRng::seed_from_u64(0),
        );
        assert!(matches!(result, Err(AnimatorError::SurfaceUnavailable)));
    }

    #[test]
    fn test_stop_releases_lease() {
        let mut a = animator(true);
        a.start().unwrap();
        a.stop();

        assert_eq!(a.state(), AnimatorState::Stopped);
        assert_eq!(a.scheduler().pending(), 0);
        assert_eq!(a.scheduler().cancelled(), 1);
        assert!(a.viewport().listeners().is_empty());
        assert!(matches!(a.start(), Err(AnimatorError::AlreadyStopped)));
    }

    #[test]
    fn test_stop_before_start() {
        let mut a = animator(true);
        a.stop();
        assert_eq!(a.state(), AnimatorState::Stopped);
        assert_eq!(a.scheduler().requested(), 0);
    }

    #[test]
    fn test_resize_requires_subscription() {
        let mut a = animator(true);
        assert!(!a.on_resize(ResizeListener(1), Bounds::new(50.0, 50.0)));

        a.start().unwrap();
        let listener = a.resize_listener().unwrap();
        assert!(!a.on_resize(ResizeListener(listener.0 + 1), Bounds::new(50.0, 50.0)));
        assert!(a.on_resize(listener, Bounds::new(50.0, 50.0)));
        assert_eq!(a.field().bounds(), Bounds::new(50.0, 50.0));
    }
}
