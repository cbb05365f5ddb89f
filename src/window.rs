//! Native window host.
//!
//! The window plays both host roles: its inner size is the [`Viewport`] and
//! `request_redraw` is the [`FrameScheduler`]. Each `RedrawRequested` event
//! fires the outstanding frame request, steps the field into the canvas and
//! presents the canvas through [`GpuState`].

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    dpi::{LogicalSize, PhysicalSize},
    window::{Window, WindowId},
};

use crate::animator::Animator;
use crate::config::FieldConfig;
use crate::error::RunError;
use crate::gpu::GpuState;
use crate::host::{FrameRequest, FrameScheduler, ResizeListener, Viewport};
use crate::raster::Canvas;
use crate::surface::Bounds;
use crate::time::{Time, FRAME_BUDGET};

/// Convert a physical size to logical pixels, rounded to whole canvas pixels.
fn logical_pixels(size: PhysicalSize<u32>, scale_factor: f64) -> (u32, u32) {
    let logical: LogicalSize<f64> = size.to_logical(scale_factor);
    (logical.width.round() as u32, logical.height.round() as u32)
}

fn logical_size(window: &Window, size: PhysicalSize<u32>) -> (u32, u32) {
    logical_pixels(size, window.scale_factor())
}

/// The window's inner size, in logical pixels, as a viewport.
pub struct WindowViewport {
    window: Arc<Window>,
    next_id: u64,
    listener: Option<ResizeListener>,
}

impl WindowViewport {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next_id: 0,
            listener: None,
        }
    }

    /// The subscribed listener, if any.
    pub fn listener(&self) -> Option<ResizeListener> {
        self.listener
    }
}

impl Viewport for WindowViewport {
    fn bounds(&self) -> Bounds {
        Bounds::from(logical_size(&self.window, self.window.inner_size()))
    }

    fn subscribe_resize(&mut self) -> ResizeListener {
        self.next_id += 1;
        let listener = ResizeListener(self.next_id);
        self.listener = Some(listener);
        listener
    }

    fn unsubscribe_resize(&mut self, listener: ResizeListener) {
        if self.listener == Some(listener) {
            self.listener = None;
        }
    }
}

/// Schedules frames through `Window::request_redraw`.
pub struct RedrawScheduler {
    window: Arc<Window>,
    next_id: u64,
    pending: Option<FrameRequest>,
}

impl RedrawScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next_id: 0,
            pending: None,
        }
    }

    /// Take the request due on this redraw.
    pub fn take_pending(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending = Some(request);
        self.window.request_redraw();
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        // A redraw already queued with winit still arrives, but finds
        // nothing pending.
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

type WindowAnimator = Animator<Canvas, WindowViewport, RedrawScheduler>;

struct App {
    config: FieldConfig,
    seed: Option<u64>,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    animator: Option<WindowAnimator>,
    time: Time,
    error: Option<RunError>,
}

impl App {
    fn new(config: FieldConfig, seed: Option<u64>) -> Self {
        Self {
            config,
            seed,
            window: None,
            gpu_state: None,
            animator: None,
            time: Time::new(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RunError> {
        let window_attrs = Window::default_attributes()
            .with_title("particle-field")
            .with_inner_size(LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.window = Some(window.clone());
        self.gpu_state = Some(pollster::block_on(GpuState::new(window.clone()))?);

        let (width, height) = logical_size(&window, window.inner_size());
        let canvas = Canvas::new(width, height);
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let mut animator = Animator::new(
            Some(canvas),
            WindowViewport::new(window.clone()),
            RedrawScheduler::new(window),
            self.config.clone(),
            &mut rng,
        )?;
        animator.start()?;
        self.animator = Some(animator);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: RunError) {
        log::error!("{}", error);
        if let Some(animator) = &mut self.animator {
            animator.stop();
        }
        self.error = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(animator) = &mut self.animator else {
            return;
        };

        let started = Instant::now();
        if let Some(request) = animator.scheduler_mut().take_pending() {
            if let Err(e) = animator.on_frame(request) {
                self.fail(event_loop, e.into());
                return;
            }
        }

        if let (Some(gpu_state), Some(canvas)) = (&mut self.gpu_state, animator.surface()) {
            match gpu_state.render(canvas) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => gpu_state.resize(PhysicalSize {
                    width: gpu_state.config.width,
                    height: gpu_state.config.height,
                }),
                Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                Err(e) => log::warn!("render error: {:?}", e),
            }
        }

        let took = started.elapsed();
        if took > FRAME_BUDGET {
            log::warn!(
                "frame {} took {:.1}ms",
                animator.field().frame(),
                took.as_secs_f64() * 1000.0
            );
        }

        if self.time.update() {
            if let Some(window) = &self.window {
                window.set_title(&format!(
                    "particle-field - frame {} - {:.0} fps - {} particles, {} connections",
                    self.time.frame(),
                    self.time.fps(),
                    animator.field().len(),
                    animator.field().last_connections().len()
                ));
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(animator) = &mut self.animator {
                    animator.stop();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
                if let (Some(animator), Some(window)) = (&mut self.animator, &self.window) {
                    let (width, height) = logical_size(window, physical_size);
                    // Assigning a canvas size discards its contents.
                    if let Some(canvas) = animator.surface_mut() {
                        canvas.resize(width, height);
                    }
                    if let Some(listener) = animator.viewport().listener() {
                        animator.on_resize(listener, Bounds::from((width, height)));
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Open a window and animate the field until it is closed.
pub fn run_window(config: FieldConfig, seed: Option<u64>) -> Result<(), RunError> {
    config.validate()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, seed);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
