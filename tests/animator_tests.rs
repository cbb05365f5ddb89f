//! Integration tests for the animator lifecycle and field behaviour.
//!
//! These drive an [`Animator`] through recording fakes for the surface,
//! viewport and scheduler, so every draw call, subscription and frame
//! request can be checked from outside.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use particle_field::prelude::*;
use particle_field::{
    AnimatorError, Connection, ConnectionFinder, FrameRequest, Particle, ResizeListener,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

// ============================================================================
// Recording fakes
// ============================================================================

#[derive(Debug, Default)]
struct HostLog {
    draws: usize,
    rects: usize,
    discs: usize,
    lines: usize,
    frames_requested: Vec<FrameRequest>,
    frames_cancelled: Vec<FrameRequest>,
    listeners: Vec<ResizeListener>,
    unsubscribed: Vec<ResizeListener>,
}

type Log = Rc<RefCell<HostLog>>;

#[derive(Debug)]
struct DrawFailed;

impl fmt::Display for DrawFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "draw failed")
    }
}

impl std::error::Error for DrawFailed {}

/// Records draw calls; fails once `fail_after` calls have succeeded.
struct RecordingSurface {
    log: Log,
    fail_after: Option<usize>,
}

impl RecordingSurface {
    fn record(&mut self, f: impl FnOnce(&mut HostLog)) -> Result<(), DrawFailed> {
        let mut log = self.log.borrow_mut();
        if self.fail_after.is_some_and(|n| log.draws >= n) {
            return Err(DrawFailed);
        }
        log.draws += 1;
        f(&mut log);
        Ok(())
    }
}

impl Surface for RecordingSurface {
    type Error = DrawFailed;

    fn fill_rect(&mut self, _: Vec2, _: Vec2, _: Rgba) -> Result<(), DrawFailed> {
        self.record(|l| l.rects += 1)
    }

    fn fill_disc(&mut self, _: Vec2, _: f32, _: Rgba) -> Result<(), DrawFailed> {
        self.record(|l| l.discs += 1)
    }

    fn stroke_line(&mut self, _: Vec2, _: Vec2, _: Rgba, _: f32) -> Result<(), DrawFailed> {
        self.record(|l| l.lines += 1)
    }
}

struct RecordingScheduler {
    log: Log,
    next: u64,
}

impl FrameScheduler for RecordingScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next += 1;
        let request = FrameRequest(self.next);
        self.log.borrow_mut().frames_requested.push(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.log.borrow_mut().frames_cancelled.push(request);
    }
}

struct RecordingViewport {
    log: Log,
    bounds: Bounds,
    next: u64,
}

impl Viewport for RecordingViewport {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn subscribe_resize(&mut self) -> ResizeListener {
        self.next += 1;
        let listener = ResizeListener(self.next);
        self.log.borrow_mut().listeners.push(listener);
        listener
    }

    fn unsubscribe_resize(&mut self, listener: ResizeListener) {
        self.log.borrow_mut().unsubscribed.push(listener);
    }
}

type TestAnimator = Animator<RecordingSurface, RecordingViewport, RecordingScheduler>;

fn build(bounds: Bounds, config: FieldConfig, fail_after: Option<usize>) -> (TestAnimator, Log) {
    let log = Log::default();
    let animator = Animator::new(
        Some(RecordingSurface {
            log: log.clone(),
            fail_after,
        }),
        RecordingViewport {
            log: log.clone(),
            bounds,
            next: 0,
        },
        RecordingScheduler {
            log: log.clone(),
            next: 0,
        },
        config,
        &mut SmallRng::seed_from_u64(1234),
    )
    .unwrap();
    (animator, log)
}

fn last_request(log: &Log) -> FrameRequest {
    *log.borrow().frames_requested.last().unwrap()
}

fn run_frames(animator: &mut TestAnimator, log: &Log, frames: usize) {
    for _ in 0..frames {
        let request = last_request(log);
        animator.on_frame(request).unwrap().unwrap();
    }
}

// ============================================================================
// Bounds invariant
// ============================================================================

#[test]
fn test_particles_stay_within_one_step_of_bounds() {
    let bounds = Bounds::new(400.0, 300.0);
    for preset in Preset::ALL {
        let config = FieldConfig::from(preset).with_speed(3.0);
        let (mut animator, log) = build(bounds, config, None);
        animator.start().unwrap();

        for _ in 0..500 {
            run_frames(&mut animator, &log, 1);
            for p in animator.field().particles() {
                let tol = p.velocity.abs() + Vec2::splat(1e-3);
                assert!(p.position.x >= -tol.x && p.position.x <= bounds.width + tol.x);
                assert!(p.position.y >= -tol.y && p.position.y <= bounds.height + tol.y);
            }
        }
    }
}

#[test]
fn test_velocity_magnitude_never_changes() {
    let (mut animator, log) = build(Bounds::new(120.0, 80.0), FieldConfig::default(), None);
    let before: Vec<Vec2> = animator.field().particles().iter().map(|p| p.velocity.abs()).collect();

    animator.start().unwrap();
    run_frames(&mut animator, &log, 2000);

    let after: Vec<Vec2> = animator.field().particles().iter().map(|p| p.velocity.abs()).collect();
    assert_eq!(before, after);
}

// ============================================================================
// Reflection
// ============================================================================

#[test]
fn test_reflection_at_right_edge() {
    let bounds = Bounds::new(200.0, 100.0);
    let particle = Particle {
        position: Vec2::new(bounds.width - 0.01, 50.0),
        velocity: Vec2::new(0.05, 0.0),
        radius: 1.0,
        color: Rgba::WHITE,
    };
    let mut field = ParticleField::with_particles(bounds, FieldConfig::default(), vec![particle]);

    field.advance();
    let p = field.particles()[0];
    assert!((p.position.x - (bounds.width + 0.04)).abs() < 1e-3);
    assert_eq!(p.velocity.x, -0.05);

    field.advance();
    let p = field.particles()[0];
    assert!((p.position.x - (bounds.width - 0.01)).abs() < 1e-3);
    assert_eq!(p.velocity.x, -0.05);
}

#[test]
fn test_reflection_at_top_edge() {
    let bounds = Bounds::new(100.0, 100.0);
    let particle = Particle {
        position: Vec2::new(50.0, 0.02),
        velocity: Vec2::new(0.0, -0.05),
        radius: 1.0,
        color: Rgba::WHITE,
    };
    let mut field = ParticleField::with_particles(bounds, FieldConfig::default(), vec![particle]);

    field.advance();
    assert!(field.particles()[0].position.y < 0.0);
    assert_eq!(field.particles()[0].velocity.y, 0.05);
}

// ============================================================================
// Particle count
// ============================================================================

#[test]
fn test_particle_count_is_floor_of_width_over_divisor() {
    for preset in Preset::ALL {
        let config = FieldConfig::from(preset);
        let k = config.density_divisor;

        for (width, expected) in [
            (0.0, 0),
            (1.0, 0),
            (k - 1.0, 0),
            (k, 1),
            (k + 1.0, 1),
            (1000.0 * k, 1000),
        ] {
            let mut rng = SmallRng::seed_from_u64(0);
            let field = ParticleField::new(Bounds::new(width, 100.0), config.clone(), &mut rng).unwrap();
            assert_eq!(field.len(), expected, "preset {preset}, width {width}");
        }
    }
}

#[test]
fn test_zero_width_still_paints_trail() {
    let (mut animator, log) = build(Bounds::new(0.0, 0.0), FieldConfig::default(), None);
    animator.start().unwrap();
    run_frames(&mut animator, &log, 3);

    let log = log.borrow();
    assert_eq!(log.rects, 3);
    assert_eq!(log.discs, 0);
    assert_eq!(log.lines, 0);
}

// ============================================================================
// Connections
// ============================================================================

fn connected(positions: &[Vec2], threshold: f32) -> Vec<Connection> {
    let mut out = Vec::new();
    ConnectionFinder::new(ConnectionIndex::Pairwise).find(positions, threshold, &mut out);
    out
}

#[test]
fn test_connections_symmetric_and_irreflexive() {
    let mut rng = SmallRng::seed_from_u64(77);
    let field = ParticleField::new(Bounds::new(600.0, 400.0), FieldConfig::default(), &mut rng).unwrap();
    let positions: Vec<Vec2> = field.particles().iter().map(|p| p.position).collect();
    let threshold = 100.0;

    let pairs = connected(&positions, threshold);
    assert!(!pairs.is_empty());

    for c in &pairs {
        assert!(c.a < c.b);
        let forward = positions[c.a].distance(positions[c.b]);
        let backward = positions[c.b].distance(positions[c.a]);
        assert!(forward < threshold && backward < threshold);
    }

    // Every close pair is reported exactly once.
    for i in 0..positions.len() {
        for j in 0..positions.len() {
            let reported = pairs
                .iter()
                .filter(|c| (c.a, c.b) == (i.min(j), i.max(j)))
                .count();
            let expected = (i != j && positions[i].distance(positions[j]) < threshold) as usize;
            assert_eq!(reported, expected, "pair ({i}, {j})");
        }
    }
}

#[test]
fn test_connection_threshold_is_strict() {
    let d = 80.0;
    assert!(connected(&[Vec2::ZERO, Vec2::new(d, 0.0)], d).is_empty());
    assert!(connected(&[Vec2::ZERO, Vec2::new(0.0, d)], d).is_empty());
    assert_eq!(connected(&[Vec2::ZERO, Vec2::new(d - 0.01, 0.0)], d).len(), 1);
}

// ============================================================================
// Resize
// ============================================================================

#[test]
fn test_resize_preserves_particles() {
    let (mut animator, log) = build(Bounds::new(500.0, 400.0), FieldConfig::default(), None);
    animator.start().unwrap();
    run_frames(&mut animator, &log, 5);

    let before: Vec<Particle> = animator.field().particles().to_vec();
    let listener = *log.borrow().listeners.last().unwrap();

    assert!(animator.on_resize(listener, Bounds::new(80.0, 60.0)));

    assert_eq!(animator.field().particles(), before.as_slice());
    assert_eq!(animator.field().bounds(), Bounds::new(80.0, 60.0));
}

#[test]
fn test_resize_leaves_outside_particles_in_place() {
    let bounds = Bounds::new(500.0, 500.0);
    let (mut animator, log) = build(bounds, FieldConfig::default(), None);
    animator.start().unwrap();

    let listener = *log.borrow().listeners.last().unwrap();
    let small = Bounds::new(100.0, 100.0);
    animator.on_resize(listener, small);

    // Far outside on x: the reflection flips vx every step, so the particle
    // rocks in place instead of being snapped back inside.
    let outside: Vec<(usize, f32)> = animator
        .field()
        .particles()
        .iter()
        .enumerate()
        .filter(|(_, p)| p.position.x > small.width + 1.0)
        .map(|(i, p)| (i, p.position.x))
        .collect();
    assert!(!outside.is_empty());

    run_frames(&mut animator, &log, 2);

    for (i, x) in outside {
        let p = animator.field().particles()[i];
        assert!((p.position.x - x).abs() < 1e-3, "particle {i} moved from {x} to {}", p.position.x);
    }
}

#[test]
fn test_resize_before_start_is_picked_up() {
    let (mut animator, log) = build(Bounds::new(300.0, 200.0), FieldConfig::default(), None);
    let count = animator.field().len();

    // Nobody is subscribed yet, so no notification is delivered.
    animator.viewport_mut().bounds = Bounds::new(100.0, 50.0);
    assert!(log.borrow().listeners.is_empty());

    animator.start().unwrap();
    assert_eq!(animator.field().bounds(), Bounds::new(100.0, 50.0));
    assert_eq!(animator.field().len(), count);

    run_frames(&mut animator, &log, 1);
    assert_eq!(animator.field().bounds(), animator.viewport().bounds());
}

// ============================================================================
// Termination
// ============================================================================

#[test]
fn test_stop_silences_frames_and_resizes() {
    let (mut animator, log) = build(Bounds::new(300.0, 300.0), FieldConfig::default(), None);
    animator.start().unwrap();
    run_frames(&mut animator, &log, 4);

    let listener = *log.borrow().listeners.last().unwrap();
    let pending = last_request(&log);
    animator.stop();

    {
        let log = log.borrow();
        assert_eq!(log.frames_cancelled, vec![pending]);
        assert_eq!(log.unsubscribed, vec![listener]);
    }

    let snapshot: Vec<Particle> = animator.field().particles().to_vec();
    let bounds = animator.field().bounds();
    let draws = log.borrow().draws;
    let requested = log.borrow().frames_requested.len();

    for n in 0..=pending.0 + 10 {
        assert_eq!(animator.on_frame(FrameRequest(n)).unwrap(), None);
    }
    for n in 0..20 {
        assert!(!animator.on_resize(listener, Bounds::new(n as f32, n as f32)));
    }

    assert_eq!(log.borrow().draws, draws);
    assert_eq!(log.borrow().frames_requested.len(), requested);
    assert_eq!(animator.field().particles(), snapshot.as_slice());
    assert_eq!(animator.field().bounds(), bounds);
    assert_eq!(animator.state(), AnimatorState::Stopped);
}

#[test]
fn test_drop_releases_lease() {
    let (mut animator, log) = build(Bounds::new(300.0, 300.0), FieldConfig::default(), None);
    animator.start().unwrap();
    let pending = last_request(&log);
    let listener = *log.borrow().listeners.last().unwrap();

    drop(animator);

    let log = log.borrow();
    assert_eq!(log.frames_cancelled, vec![pending]);
    assert_eq!(log.unsubscribed, vec![listener]);
}

#[test]
fn test_surface_failure_stops_and_releases() {
    // Trail rect plus a few discs succeed, then the surface fails.
    let (mut animator, log) = build(Bounds::new(300.0, 300.0), FieldConfig::default(), Some(4));
    animator.start().unwrap();
    let request = last_request(&log);
    let listener = *log.borrow().listeners.last().unwrap();

    let result = animator.on_frame(request);

    assert!(matches!(result, Err(AnimatorError::Surface(_))));
    assert_eq!(animator.state(), AnimatorState::Stopped);
    assert_eq!(animator.pending_frame(), None);

    let log_ref = log.borrow();
    // The fired request was consumed, so nothing is left to cancel.
    assert!(log_ref.frames_cancelled.is_empty());
    assert_eq!(log_ref.frames_requested.len(), 1);
    assert_eq!(log_ref.unsubscribed, vec![listener]);
    drop(log_ref);

    assert!(matches!(animator.start(), Err(AnimatorError::AlreadyStopped)));
}

#[test]
fn test_inert_animator_never_touches_host() {
    let log = Log::default();
    let mut animator: TestAnimator = Animator::new(
        None,
        RecordingViewport {
            log: log.clone(),
            bounds: Bounds::new(800.0, 600.0),
            next: 0,
        },
        RecordingScheduler {
            log: log.clone(),
            next: 0,
        },
        FieldConfig::default(),
        &mut SmallRng::seed_from_u64(0),
    )
    .unwrap();

    animator.start().unwrap();
    assert_eq!(animator.on_frame(FrameRequest(1)).unwrap(), None);
    animator.stop();

    let log = log.borrow();
    assert!(log.frames_requested.is_empty());
    assert!(log.listeners.is_empty());
    assert_eq!(log.draws, 0);
}
