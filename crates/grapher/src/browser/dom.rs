//! DOM event names and input normalisation.
//!
//! Kept free of `web-sys` so the mapping is testable natively.

use grapher_core::EventSource;

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenTarget {
    /// The canvas element itself
    Canvas,
    /// The window (keys and viewport resizes)
    Window,
}

/// DOM event backing one [`EventSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomBinding {
    /// DOM event type
    pub event: &'static str,
    /// Element the listener goes on
    pub target: ListenTarget,
}

impl DomBinding {
    const fn canvas(event: &'static str) -> Self {
        Self {
            event,
            target: ListenTarget::Canvas,
        }
    }

    const fn window(event: &'static str) -> Self {
        Self {
            event,
            target: ListenTarget::Window,
        }
    }

    /// DOM binding for `source`; `None` for animation frames, which are not
    /// DOM events.
    #[must_use]
    pub const fn for_source(source: EventSource) -> Option<Self> {
        match source {
            EventSource::PointerDown => Some(Self::canvas("pointerdown")),
            EventSource::PointerMove => Some(Self::canvas("pointermove")),
            EventSource::PointerUp => Some(Self::canvas("pointerup")),
            EventSource::PointerLeave => Some(Self::canvas("pointerleave")),
            EventSource::Wheel => Some(Self::canvas("wheel")),
            EventSource::KeyDown => Some(Self::window("keydown")),
            EventSource::Resize => Some(Self::window("resize")),
            EventSource::AnimationFrame => None,
        }
    }
}

/// Line height assumed for wheel events reported in lines.
const WHEEL_LINE_PX: f64 = 16.0;

/// Wheel delta in pixels, whatever unit the browser reported.
///
/// `delta_mode` follows `WheelEvent.deltaMode`: 0 pixels, 1 lines, 2 pages.
#[must_use]
pub fn wheel_delta_px(delta_y: f64, delta_mode: u32, page_height: f64) -> f32 {
    let px = match delta_mode {
        1 => delta_y * WHEEL_LINE_PX,
        2 => delta_y * page_height,
        _ => delta_y,
    };
    px as f32
}

/// Whether keys typed into an element with this tag belong to the page, not
/// the grapher.
#[must_use]
pub fn is_text_entry(tag_name: &str) -> bool {
    ["INPUT", "TEXTAREA", "SELECT"]
        .iter()
        .any(|tag| tag.eq_ignore_ascii_case(tag_name))
}
