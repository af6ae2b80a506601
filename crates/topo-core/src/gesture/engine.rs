use std::sync::mpsc;
use std::thread::JoinHandle;

use tracing::{debug, info};

use crate::config::ViewConfig;
use crate::error::{Result, TopoError};
use crate::geometry::{ContentImage, NormalizedPoint, ScreenPoint, Viewport};
use crate::marker;
use crate::transform::TransformState;

use super::session::{GestureSession, SessionContext};
use super::GestureEvent;

/// State change produced by one gesture event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewEvent {
    /// A pan or pinch update moved the content.
    TransformChanged(TransformState),
    /// All interactions ended and the transform came to rest.
    Settled(TransformState),
    /// A tap landed on the image.
    Tapped(NormalizedPoint),
}

/// Read-only copy of a view's geometry, taken at "confirm crop" time.
///
/// Gestures arriving after the snapshot do not affect it. `generation`
/// identifies the loaded image so stale work can be detected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewSnapshot {
    pub transform: TransformState,
    pub viewport: Viewport,
    pub content: ContentImage,
    pub generation: u64,
}

/// Pan/zoom state of one view instance.
pub struct ViewportEngine {
    config: ViewConfig,
    viewport: Viewport,
    content: Option<ContentImage>,
    transform: TransformState,
    session: GestureSession,
    generation: u64,
}

impl ViewportEngine {
    pub fn new(viewport: Viewport, config: ViewConfig) -> Result<Self> {
        config.validate()?;
        if !viewport.is_measured() {
            return Err(TopoError::NotReady("viewport has no measured size".into()));
        }
        Ok(Self {
            transform: TransformState::reset_for(&config.limits),
            config,
            viewport,
            content: None,
            session: GestureSession::new(),
            generation: 0,
        })
    }

    pub fn transform(&self) -> TransformState {
        self.transform
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn content(&self) -> Option<&ContentImage> {
        self.content.as_ref()
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn session(&self) -> &GestureSession {
        &self.session
    }

    /// Incremented every time the image or viewport changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Show a new image and reset the transform.
    pub fn load_image(&mut self, original_width: u32, original_height: u32) -> Result<()> {
        let content =
            ContentImage::fit(original_width, original_height, self.viewport, self.config.fit)?;
        info!(
            width = original_width,
            height = original_height,
            display_width = content.display_width,
            display_height = content.display_height,
            fit = %self.config.fit,
            "Image loaded"
        );
        self.content = Some(content);
        self.reset();
        Ok(())
    }

    /// The on-screen frame changed size (e.g. rotation). Refits the image and
    /// resets the transform.
    pub fn resize_viewport(&mut self, viewport: Viewport) -> Result<()> {
        if !viewport.is_measured() {
            return Err(TopoError::NotReady("viewport has no measured size".into()));
        }
        let content = match self.content {
            Some(c) => Some(ContentImage::fit(
                c.original_width,
                c.original_height,
                viewport,
                self.config.fit,
            )?),
            None => None,
        };
        self.viewport = viewport;
        self.content = content;
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.session.cancel();
        self.generation += 1;
        self.transform = TransformState::reset_for(&self.config.limits);
        if let Some(content) = self.content.as_ref() {
            self.transform = self.transform.clamp_translation(content, &self.viewport);
        }
    }

    /// Restore a previously saved transform, clamped into the current limits
    /// and bounds. Ends any live gesture.
    pub fn restore(&mut self, transform: TransformState) -> Result<TransformState> {
        transform.validate()?;
        let content = self
            .content
            .ok_or_else(|| TopoError::NotReady("no image loaded".into()))?;
        self.session.cancel();
        self.transform = transform.clamped(&self.config.limits, &content, &self.viewport);
        Ok(self.transform)
    }

    /// Freeze the current geometry for crop finalization.
    pub fn snapshot(&self) -> Result<ViewSnapshot> {
        let content = self
            .content
            .ok_or_else(|| TopoError::NotReady("no image loaded".into()))?;
        Ok(ViewSnapshot {
            transform: self.transform,
            viewport: self.viewport,
            content,
            generation: self.generation,
        })
    }

    /// Apply one event. Returns `None` when nothing observable changed.
    ///
    /// Events carrying invalid geometry are dropped and the previous transform
    /// is kept.
    pub fn handle(&mut self, event: GestureEvent) -> Option<ViewEvent> {
        let Some(content) = self.content else {
            debug!(%event, "Ignoring gesture, no image loaded");
            return None;
        };
        let limits = self.config.limits;
        let viewport = self.viewport;
        let ctx = SessionContext {
            limits: &limits,
            content: &content,
            viewport: &viewport,
            pinch_overshoot: self.config.pinch_overshoot,
        };

        let outcome = match event {
            GestureEvent::PanStart => self.session.pan_start(self.transform).map(|_| None),
            GestureEvent::PanUpdate { dx, dy } => self
                .session
                .pan_update(self.transform, dx, dy, &ctx)
                .map(Some),
            GestureEvent::PinchStart { focal_x, focal_y } => self
                .session
                .pinch_start(self.transform, ScreenPoint::new(focal_x, focal_y))
                .map(|_| None),
            GestureEvent::PinchUpdate {
                scale_factor,
                focal_x,
                focal_y,
            } => self
                .session
                .pinch_update(
                    self.transform,
                    scale_factor,
                    ScreenPoint::new(focal_x, focal_y),
                    &ctx,
                )
                .map(Some),
            GestureEvent::PanEnd => {
                self.session.pan_end();
                return self.settle_if_idle(&ctx);
            }
            GestureEvent::PinchEnd => {
                self.session.pinch_end();
                return self.settle_if_idle(&ctx);
            }
            GestureEvent::Tap { x, y } => {
                return match marker::place_marker(
                    ScreenPoint::new(x, y),
                    &self.transform,
                    &viewport,
                    &content,
                ) {
                    Ok(point) => Some(ViewEvent::Tapped(point)),
                    Err(e) => {
                        debug!(%event, error = %e, "Tap ignored");
                        None
                    }
                };
            }
        };

        match outcome {
            Ok(Some(next)) if next != self.transform => {
                self.transform = next;
                Some(ViewEvent::TransformChanged(next))
            }
            Ok(_) => None,
            Err(e) => {
                debug!(%event, error = %e, "Gesture event rejected");
                None
            }
        }
    }

    fn settle_if_idle(&mut self, ctx: &SessionContext<'_>) -> Option<ViewEvent> {
        if !self.session.is_idle() {
            return None;
        }
        let settled = self.session.settle(self.transform, ctx);
        if settled != self.transform {
            debug!(from = ?self.transform, to = ?settled, "Transform settled");
            self.transform = settled;
            Some(ViewEvent::Settled(settled))
        } else {
            None
        }
    }

    /// Drain `events` until every sender is dropped, forwarding changes.
    pub fn run(&mut self, events: mpsc::Receiver<GestureEvent>, changes: mpsc::Sender<ViewEvent>) {
        for event in events {
            if let Some(change) = self.handle(event) {
                if changes.send(change).is_err() {
                    break;
                }
            }
        }
    }
}

/// A view engine running on its own thread behind a pair of channels.
pub struct EventLoop {
    pub events: mpsc::Sender<GestureEvent>,
    pub changes: mpsc::Receiver<ViewEvent>,
    handle: JoinHandle<ViewportEngine>,
}

impl EventLoop {
    /// Close the input channel, wait for the engine to drain it, and return
    /// the engine with every change not yet received.
    pub fn finish(self) -> Result<(ViewportEngine, Vec<ViewEvent>)> {
        drop(self.events);
        let engine = self
            .handle
            .join()
            .map_err(|_| TopoError::Io(std::io::Error::other("gesture thread panicked")))?;
        let pending = self.changes.try_iter().collect();
        Ok((engine, pending))
    }
}

/// Move `engine` onto a dedicated input thread.
pub fn spawn_event_loop(mut engine: ViewportEngine) -> Result<EventLoop> {
    let (event_tx, event_rx) = mpsc::channel::<GestureEvent>();
    let (change_tx, change_rx) = mpsc::channel::<ViewEvent>();

    let handle = std::thread::Builder::new()
        .name("topo-gestures".into())
        .spawn(move || {
            engine.run(event_rx, change_tx);
            engine
        })?;

    Ok(EventLoop {
        events: event_tx,
        changes: change_rx,
        handle,
    })
}
