//! Host collaborators: the viewport and the frame scheduler.
//!
//! The animator never drives itself. A host owns the event loop, asks the
//! scheduler which frame is due and calls
//! [`Animator::on_frame`](crate::Animator::on_frame); it forwards size changes
//! to the subscribed listener through
//! [`Animator::on_resize`](crate::Animator::on_resize).
//!
//! [`ManualScheduler`] and [`FixedViewport`] are a complete host for headless
//! rendering and tests: nothing happens until the caller pumps them.

use std::collections::VecDeque;

use crate::surface::Bounds;

/// Handle for one scheduled frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Handle for a resize subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResizeListener(pub u64);

/// "Run a callback before the next repaint", one shot per request.
pub trait FrameScheduler {
    /// Ask for one frame. The host later reports it back via `on_frame`.
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraw a request that has not fired yet.
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// The drawable area and its resize notifications.
pub trait Viewport {
    /// Current drawable size.
    fn bounds(&self) -> Bounds;

    fn subscribe_resize(&mut self) -> ResizeListener;

    fn unsubscribe_resize(&mut self, listener: ResizeListener);
}

/// A scheduler that fires only when the caller pumps it.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: VecDeque<FrameRequest>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the oldest outstanding request, as a display refresh would.
    pub fn take_due(&mut self) -> Option<FrameRequest> {
        self.pending.pop_front()
    }

    /// Outstanding requests.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Total requests made so far.
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Total requests withdrawn before firing.
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        self.requested += 1;
        let request = FrameRequest(self.next_id);
        self.pending.push_back(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let before = self.pending.len();
        self.pending.retain(|r| *r != request);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }
}

/// A viewport whose size changes only through [`FixedViewport::set_bounds`].
#[derive(Debug)]
pub struct FixedViewport {
    bounds: Bounds,
    next_id: u64,
    listeners: Vec<ResizeListener>,
}

impl FixedViewport {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    /// Change the size. Returns the listeners to notify.
    pub fn set_bounds(&mut self, bounds: Bounds) -> Vec<ResizeListener> {
        self.bounds = bounds;
        self.listeners.clone()
    }

    pub fn listeners(&self) -> &[ResizeListener] {
        &self.listeners
    }
}

impl Viewport for FixedViewport {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn subscribe_resize(&mut self) -> ResizeListener {
        self.next_id += 1;
        let listener = ResizeListener(self.next_id);
        self.listeners.push(listener);
        listener
    }

    fn unsubscribe_resize(&mut self, listener: ResizeListener) {
        self.listeners.retain(|l| *l != listener);
    }
}
