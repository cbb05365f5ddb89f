//! Offscreen rendering with a manually pumped host.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::animator::Animator;
use crate::config::FieldConfig;
use crate::error::RunError;
use crate::field::FrameStats;
use crate::host::{FixedViewport, ManualScheduler};
use crate::raster::Canvas;
use crate::surface::Bounds;

/// Parameters for an offscreen run.
#[derive(Clone, Debug)]
pub struct HeadlessOptions {
    pub width: u32,
    pub height: u32,
    /// Number of frames to render.
    pub frames: u64,
    /// Seed for particle placement.
    pub seed: u64,
    pub config: FieldConfig,
    /// Resize the viewport to `(width, height)` right before the given
    /// 1-based frame.
    pub resize: Option<(u64, u32, u32)>,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            frames: 120,
            seed: 0,
            config: FieldConfig::default(),
            resize: None,
        }
    }
}

/// Result of an offscreen run.
#[derive(Debug)]
pub struct HeadlessRun {
    /// The canvas after the last frame.
    pub canvas: Canvas,
    /// Stats of the last frame, if any frame ran.
    pub last: Option<FrameStats>,
    /// Total connections drawn over the run.
    pub connections_drawn: u64,
}

/// Render `options.frames` frames deterministically.
pub fn render_headless(options: &HeadlessOptions) -> Result<HeadlessRun, RunError> {
    let mut rng = SmallRng::seed_from_u64(options.seed);
    let viewport = FixedViewport::new(Bounds::from((options.width, options.height)));
    let canvas = Canvas::new(options.width, options.height);

    let mut animator = Animator::new(
        Some(canvas),
        viewport,
        ManualScheduler::new(),
        options.config.clone(),
        &mut rng,
    )?;
    animator.start()?;

    let mut last = None;
    let mut connections_drawn = 0;

    for frame in 1..=options.frames {
        if let Some((at, w, h)) = options.resize {
            if at == frame {
                resize(&mut animator, w, h);
            }
        }

        let Some(request) = animator.scheduler_mut().take_due() else {
            break;
        };
        if let Some(stats) = animator.on_frame(request)? {
            connections_drawn += stats.connections as u64;
            last = Some(stats);
        }
    }

    animator.stop();
    let canvas = animator
        .surface()
        .cloned()
        .unwrap_or_else(|| Canvas::new(0, 0));

    log::debug!(
        "headless run finished after {} frames, {} connections drawn",
        last.map_or(0, |s| s.frame),
        connections_drawn
    );

    Ok(HeadlessRun {
        canvas,
        last,
        connections_drawn,
    })
}

fn resize(animator: &mut Animator<Canvas, FixedViewport, ManualScheduler>, width: u32, height: u32) {
    let bounds = Bounds::from((width, height));
    if let Some(canvas) = animator.surface_mut() {
        canvas.resize(width, height);
    }
    for listener in animator.viewport_mut().set_bounds(bounds) {
        animator.on_resize(listener, bounds);
    }
}
