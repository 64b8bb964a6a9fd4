//! The seam between the engine and whatever hosts it.
//!
//! A [`Host`] resolves a canvas id to a drawing [`Surface`] and keeps a table
//! of [`EventHandler`]s, one per [`EventSource`]. The browser crate provides a
//! DOM-backed host; [`MemoryHost`] is an in-memory host for tests and native
//! embedding.

use crate::canvas::Frame;
use crate::error::{RenderError, StartupError};
use crate::event::InputEvent;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Kinds of host callbacks a session registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventSource {
    /// Pointer button pressed
    PointerDown,
    /// Pointer moved
    PointerMove,
    /// Pointer button released
    PointerUp,
    /// Pointer left the canvas
    PointerLeave,
    /// Wheel scrolled
    Wheel,
    /// Key pressed
    KeyDown,
    /// Canvas resized
    Resize,
    /// Paint opportunity
    AnimationFrame,
}

impl EventSource {
    /// Every source, in registration order.
    pub const ALL: [Self; 8] = [
        Self::PointerDown,
        Self::PointerMove,
        Self::PointerUp,
        Self::PointerLeave,
        Self::Wheel,
        Self::KeyDown,
        Self::Resize,
        Self::AnimationFrame,
    ];
}

/// An event delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// User input or a resize
    Input(InputEvent),
    /// A paint opportunity
    AnimationFrame {
        /// Host timestamp in milliseconds
        timestamp_ms: f64,
    },
}

impl HostEvent {
    /// Which callback table entry this event is delivered to.
    #[must_use]
    pub const fn source(&self) -> EventSource {
        match self {
            Self::AnimationFrame { .. } => EventSource::AnimationFrame,
            Self::Input(input) => match input {
                InputEvent::PointerDown { .. } => EventSource::PointerDown,
                InputEvent::PointerMove { .. } => EventSource::PointerMove,
                InputEvent::PointerUp { .. } => EventSource::PointerUp,
                InputEvent::PointerLeave => EventSource::PointerLeave,
                InputEvent::Wheel { .. } => EventSource::Wheel,
                InputEvent::KeyDown { .. } => EventSource::KeyDown,
                InputEvent::Resize { .. } => EventSource::Resize,
            },
        }
    }
}

/// What a handler did with an event.
///
/// Ordered so that combining responses keeps the strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandlerResponse {
    /// Not relevant; let the host apply its default behaviour
    Ignored,
    /// Consumed; suppress the host default (page scroll, key shortcuts)
    Handled,
    /// Consumed, and a paint opportunity is needed
    RequestFrame,
}

impl HandlerResponse {
    /// Whether the host should suppress its default action.
    #[must_use]
    pub const fn consumed(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// A callback installed in the host's table.
pub trait EventHandler {
    /// React to one event.
    fn handle(&mut self, event: &HostEvent) -> HandlerResponse;

    /// The host could not schedule the frame this handler asked for.
    fn frame_refused(&mut self) {}
}

impl<F> EventHandler for F
where
    F: FnMut(&HostEvent) -> HandlerResponse,
{
    fn handle(&mut self, event: &HostEvent) -> HandlerResponse {
        self(event)
    }
}

/// Key into the host's callback table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(pub u64);

/// A drawing target owned by the renderer.
pub trait Surface {
    /// Current size in pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface is gone.
    fn size(&self) -> Result<(u32, u32), RenderError>;

    /// Replace the visible contents with `frame`.
    ///
    /// Either the whole frame becomes visible or the previous one stays.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface rejects the frame.
    fn present(&mut self, frame: &Frame) -> Result<(), RenderError>;
}

/// The environment a session runs in.
pub trait Host {
    /// Surface type produced for a canvas.
    type Surface: Surface;

    /// Look up a canvas by id and acquire its drawing surface.
    ///
    /// # Errors
    ///
    /// Returns an error if no usable canvas has this id.
    fn resolve_surface(&mut self, canvas_id: &str) -> Result<Self::Surface, StartupError>;

    /// Install a handler for events from `source` on the given canvas.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::Registration`] if the host refuses.
    fn register(
        &mut self,
        canvas_id: &str,
        source: EventSource,
        handler: Box<dyn EventHandler>,
    ) -> Result<CallbackId, StartupError>;

    /// Remove a handler. Unknown ids are ignored.
    fn deregister(&mut self, id: CallbackId);

    /// Ask for an [`HostEvent::AnimationFrame`] on the given canvas soon.
    ///
    /// Returns `false` if no paint opportunity could be scheduled.
    fn request_frame(&mut self, canvas_id: &str) -> bool;
}

#[derive(Debug, Default)]
struct SurfaceState {
    width: u32,
    height: u32,
    failing: bool,
    presented: usize,
    last: Option<Frame>,
}

/// An in-memory surface that keeps the last presented frame.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl MemorySurface {
    /// Create a surface and the monitor that observes it.
    #[must_use]
    pub fn new(width: u32, height: u32) -> (Self, SurfaceMonitor) {
        let state = Rc::new(RefCell::new(SurfaceState {
            width,
            height,
            ..SurfaceState::default()
        }));
        (
            Self {
                state: Rc::clone(&state),
            },
            SurfaceMonitor { state },
        )
    }
}

impl Surface for MemorySurface {
    fn size(&self) -> Result<(u32, u32), RenderError> {
        let state = self.state.borrow();
        if state.failing {
            return Err(RenderError::SurfaceUnavailable(
                "surface marked as failing".to_string(),
            ));
        }
        Ok((state.width, state.height))
    }

    fn present(&mut self, frame: &Frame) -> Result<(), RenderError> {
        let mut state = self.state.borrow_mut();
        if state.failing {
            return Err(RenderError::SurfaceUnavailable(
                "surface marked as failing".to_string(),
            ));
        }
        state.presented += 1;
        state.last = Some(frame.clone());
        Ok(())
    }
}

/// Test-side view of a [`MemorySurface`].
#[derive(Debug, Clone)]
pub struct SurfaceMonitor {
    state: Rc<RefCell<SurfaceState>>,
}

impl SurfaceMonitor {
    /// How many frames were committed.
    #[must_use]
    pub fn frames_presented(&self) -> usize {
        self.state.borrow().presented
    }

    /// The most recently committed frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<Frame> {
        self.state.borrow().last.clone()
    }

    /// Make the surface reject every call.
    pub fn set_failing(&self, failing: bool) {
        self.state.borrow_mut().failing = failing;
    }

    /// Change the reported size.
    pub fn resize(&self, width: u32, height: u32) {
        let mut state = self.state.borrow_mut();
        state.width = width;
        state.height = height;
    }
}

#[derive(Debug)]
enum Element {
    Canvas(MemorySurface),
    NoContext,
    Other,
}

struct Registration {
    id: CallbackId,
    canvas_id: String,
    source: EventSource,
    handler: Box<dyn EventHandler>,
}

/// In-memory host for tests.
///
/// Events are delivered synchronously by [`MemoryHost::dispatch`]; paint
/// opportunities by [`MemoryHost::run_frame`].
#[derive(Default)]
pub struct MemoryHost {
    elements: HashMap<String, Element>,
    handlers: Vec<Registration>,
    next_id: u64,
    refuse: Option<EventSource>,
    refuse_frames: bool,
    frame_requested: bool,
    frame_requests: usize,
}

impl std::fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHost")
            .field("elements", &self.elements.len())
            .field("handlers", &self.handlers.len())
            .field("frame_requested", &self.frame_requested)
            .finish()
    }
}

impl MemoryHost {
    /// Create an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canvas and return a monitor on its surface.
    pub fn add_canvas(&mut self, id: &str, width: u32, height: u32) -> SurfaceMonitor {
        let (surface, monitor) = MemorySurface::new(width, height);
        self.elements
            .insert(id.to_string(), Element::Canvas(surface));
        monitor
    }

    /// Add a canvas whose drawing context cannot be acquired.
    pub fn add_canvas_without_context(&mut self, id: &str) {
        self.elements.insert(id.to_string(), Element::NoContext);
    }

    /// Add an element that is not a canvas.
    pub fn add_element(&mut self, id: &str) {
        self.elements.insert(id.to_string(), Element::Other);
    }

    /// Make registration of `source` fail.
    pub fn refuse_registration(&mut self, source: EventSource) {
        self.refuse = Some(source);
    }

    /// Make every frame request fail until called again with `false`.
    pub fn refuse_frames(&mut self, refuse: bool) {
        self.refuse_frames = refuse;
    }

    /// Number of installed handlers.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.handlers.len()
    }

    /// Whether a paint opportunity is pending.
    #[must_use]
    pub const fn frame_requested(&self) -> bool {
        self.frame_requested
    }

    /// How many times a frame was requested in total.
    #[must_use]
    pub const fn frame_requests(&self) -> usize {
        self.frame_requests
    }

    /// Deliver an input event to every matching handler.
    ///
    /// Returns the strongest response.
    pub fn dispatch(&mut self, event: InputEvent) -> HandlerResponse {
        self.deliver(&HostEvent::Input(event))
    }

    /// Run a pending paint opportunity, if any.
    ///
    /// Returns whether one was pending.
    pub fn run_frame(&mut self, timestamp_ms: f64) -> bool {
        if !self.frame_requested {
            return false;
        }
        self.frame_requested = false;
        self.deliver(&HostEvent::AnimationFrame { timestamp_ms });
        true
    }

    fn deliver(&mut self, event: &HostEvent) -> HandlerResponse {
        let source = event.source();
        let mut response = HandlerResponse::Ignored;
        for registration in self.handlers.iter_mut().filter(|r| r.source == source) {
            let handled = registration.handler.handle(event);
            if handled == HandlerResponse::RequestFrame {
                if self.refuse_frames {
                    registration.handler.frame_refused();
                } else {
                    self.frame_requested = true;
                    self.frame_requests += 1;
                }
            }
            response = response.max(handled);
        }
        response
    }
}

impl Host for MemoryHost {
    type Surface = MemorySurface;

    fn resolve_surface(&mut self, canvas_id: &str) -> Result<Self::Surface, StartupError> {
        match self.elements.get(canvas_id) {
            None => Err(StartupError::CanvasNotFound(canvas_id.to_string())),
            Some(Element::Other) => Err(StartupError::NotACanvas(canvas_id.to_string())),
            Some(Element::NoContext) => Err(StartupError::ContextUnavailable(format!(
                "canvas '{canvas_id}' has no 2d context"
            ))),
            Some(Element::Canvas(surface)) => Ok(surface.clone()),
        }
    }

    fn register(
        &mut self,
        canvas_id: &str,
        source: EventSource,
        handler: Box<dyn EventHandler>,
    ) -> Result<CallbackId, StartupError> {
        if self.refuse == Some(source) {
            return Err(StartupError::Registration {
                event: source,
                reason: "refused by host".to_string(),
            });
        }
        self.next_id += 1;
        let id = CallbackId(self.next_id);
        self.handlers.push(Registration {
            id,
            canvas_id: canvas_id.to_string(),
            source,
            handler,
        });
        Ok(id)
    }

    fn deregister(&mut self, id: CallbackId) {
        self.handlers.retain(|r| r.id != id);
    }

    fn request_frame(&mut self, canvas_id: &str) -> bool {
        if self.refuse_frames || !self.handlers.iter().any(|r| r.canvas_id == canvas_id) {
            return false;
        }
        self.frame_requested = true;
        self.frame_requests += 1;
        true
    }
}
