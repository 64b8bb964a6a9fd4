//! Turning input into viewport changes, and coalescing redraws.

use crate::config::InteractionConfig;
use crate::event::{InputEvent, Key, MouseButton};
use crate::geometry::Point;
use crate::viewport::{ResizeMode, Viewport};
use log::warn;

/// Applies pan, zoom, resize and key commands to a viewport.
#[derive(Debug, Clone, Default)]
pub struct Controller {
    config: InteractionConfig,
    resize_mode: ResizeMode,
    /// Last pointer position while the primary button is held.
    drag: Option<Point>,
}

impl Controller {
    /// Create a controller.
    #[must_use]
    pub const fn new(config: InteractionConfig, resize_mode: ResizeMode) -> Self {
        Self {
            config,
            resize_mode,
            drag: None,
        }
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Whether the host should suppress its default handling of `event`.
    #[must_use]
    pub fn consumes(&self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Wheel { .. } => true,
            InputEvent::PointerDown { button, .. } => *button == MouseButton::Left,
            InputEvent::PointerMove { .. } | InputEvent::PointerUp { .. } => self.is_dragging(),
            InputEvent::KeyDown { key } => *key != Key::Other,
            InputEvent::PointerLeave | InputEvent::Resize { .. } => false,
        }
    }

    /// Apply `event` to `viewport`.
    ///
    /// Returns whether the viewport changed and needs a redraw.
    pub fn handle(&mut self, event: &InputEvent, viewport: &mut Viewport) -> bool {
        match *event {
            InputEvent::PointerDown { position, button } => {
                if button == MouseButton::Left {
                    self.drag = Some(position);
                }
                false
            }
            InputEvent::PointerMove { position } => self.drag_to(position, viewport),
            InputEvent::PointerUp { position, button } => {
                if button != MouseButton::Left {
                    return false;
                }
                let changed = self.drag_to(position, viewport);
                self.drag = None;
                changed
            }
            InputEvent::PointerLeave => {
                self.drag = None;
                false
            }
            InputEvent::Wheel { position, delta_y } => {
                let factor = (-f64::from(delta_y) * self.config.wheel_sensitivity).exp();
                viewport.zoom(factor, (f64::from(position.x), f64::from(position.y)))
            }
            InputEvent::Resize { width, height } => {
                if (width, height) == (viewport.width(), viewport.height()) {
                    return false;
                }
                match viewport.resize(width, height, self.resize_mode) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("Ignoring resize: {e}");
                        false
                    }
                }
            }
            InputEvent::KeyDown { key } => self.key(key, viewport),
        }
    }

    fn drag_to(&mut self, position: Point, viewport: &mut Viewport) -> bool {
        let Some(last) = self.drag else {
            return false;
        };
        self.drag = Some(position);
        let delta = position - last;
        viewport.pan(f64::from(delta.x), f64::from(delta.y))
    }

    fn key(&self, key: Key, viewport: &mut Viewport) -> bool {
        let step = self.config.key_pan_px;
        let center = (
            f64::from(viewport.width()) / 2.0,
            f64::from(viewport.height()) / 2.0,
        );
        match key {
            // Arrows look in their direction, the opposite of dragging.
            Key::Left => viewport.pan(step, 0.0),
            Key::Right => viewport.pan(-step, 0.0),
            Key::Up => viewport.pan(0.0, step),
            Key::Down => viewport.pan(0.0, -step),
            Key::ZoomIn => viewport.zoom(self.config.key_zoom_factor, center),
            Key::ZoomOut => viewport.zoom(1.0 / self.config.key_zoom_factor, center),
            Key::Reset => viewport.reset(),
            Key::Other => false,
        }
    }
}

/// Single pending-redraw flag.
///
/// Any number of requests between two paint opportunities collapse into one
/// paint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedrawScheduler {
    pending: bool,
}

impl RedrawScheduler {
    /// Create an idle scheduler.
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: false }
    }

    /// Mark a redraw as needed.
    ///
    /// Returns `true` only on the transition from idle to pending, which is
    /// when the host must be asked for a paint opportunity.
    pub fn request(&mut self) -> bool {
        let was_idle = !self.pending;
        self.pending = true;
        was_idle
    }

    /// Consume the pending flag at a paint opportunity.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Drop a pending redraw whose paint opportunity never came.
    pub fn cancel(&mut self) {
        self.pending = false;
    }

    /// Whether a redraw is pending.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }
}
