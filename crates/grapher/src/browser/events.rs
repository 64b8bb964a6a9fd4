//! Browser event handling - converts DOM events to grapher input.

use super::canvas2d::fit_to_client;
use super::dom::{is_text_entry, wheel_delta_px};
use grapher_core::{EventSource, InputEvent, Key, MouseButton, Point};
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent};

/// Convert a DOM event delivered for `source` into grapher input.
///
/// Returns `None` for events the grapher does not act on.
pub fn to_input(
    source: EventSource,
    event: &Event,
    canvas: &HtmlCanvasElement,
) -> Option<InputEvent> {
    match source {
        EventSource::PointerDown | EventSource::PointerMove | EventSource::PointerUp => {
            pointer_input(source, event.dyn_ref::<MouseEvent>()?)
        }
        EventSource::PointerLeave => Some(InputEvent::PointerLeave),
        EventSource::Wheel => wheel_input(event.dyn_ref::<WheelEvent>()?, canvas),
        EventSource::KeyDown => key_input(event.dyn_ref::<KeyboardEvent>()?),
        EventSource::Resize => {
            fit_to_client(canvas).map(|(width, height)| InputEvent::Resize { width, height })
        }
        EventSource::AnimationFrame => None,
    }
}

fn position(event: &MouseEvent) -> Point {
    Point::new(event.offset_x() as f32, event.offset_y() as f32)
}

fn pointer_input(source: EventSource, event: &MouseEvent) -> Option<InputEvent> {
    let position = position(event);
    match source {
        EventSource::PointerMove => Some(InputEvent::PointerMove { position }),
        EventSource::PointerDown => Some(InputEvent::PointerDown {
            position,
            button: MouseButton::from_dom_index(event.button())?,
        }),
        EventSource::PointerUp => Some(InputEvent::PointerUp {
            position,
            button: MouseButton::from_dom_index(event.button())?,
        }),
        _ => None,
    }
}

fn wheel_input(event: &WheelEvent, canvas: &HtmlCanvasElement) -> Option<InputEvent> {
    let delta_y = wheel_delta_px(
        event.delta_y(),
        event.delta_mode(),
        f64::from(canvas.height()),
    );
    if delta_y == 0.0 {
        return None;
    }
    Some(InputEvent::Wheel {
        position: position(event),
        delta_y,
    })
}

fn key_input(event: &KeyboardEvent) -> Option<InputEvent> {
    if event.ctrl_key() || event.meta_key() || event.alt_key() {
        return None;
    }
    let typing = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .is_some_and(|element| is_text_entry(&element.tag_name()));
    if typing {
        return None;
    }
    match Key::from_key_str(&event.key()) {
        Key::Other => None,
        key => Some(InputEvent::KeyDown { key }),
    }
}
