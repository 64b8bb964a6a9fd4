//! DOM-backed [`Host`]: event listeners and animation frames.

use super::canvas2d::{fit_to_client, Canvas2DSurface};
use super::dom::{DomBinding, ListenTarget};
use super::events::to_input;
use grapher_core::{
    CallbackId, EventHandler, EventSource, HandlerResponse, Host, HostEvent, StartupError,
};
use log::{debug, warn};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Document, Event, EventTarget, HtmlCanvasElement, Window};

/// Paint-opportunity callback for one canvas.
struct FrameSlot {
    id: CallbackId,
    /// Handle of the outstanding `requestAnimationFrame`, if any.
    pending: Rc<Cell<Option<i32>>>,
    callback: Closure<dyn FnMut(f64)>,
}

/// Animation-frame slots shared by the host and its listeners.
#[derive(Clone)]
struct FrameTable {
    window: Window,
    slots: Rc<RefCell<HashMap<String, FrameSlot>>>,
}

impl FrameTable {
    /// Schedule one animation frame for `canvas_id` unless one is pending.
    ///
    /// Returns whether a frame is now on its way.
    fn request(&self, canvas_id: &str) -> bool {
        let slots = self.slots.borrow();
        let Some(slot) = slots.get(canvas_id) else {
            return false;
        };
        if slot.pending.get().is_some() {
            return true;
        }
        match self
            .window
            .request_animation_frame(slot.callback.as_ref().unchecked_ref())
        {
            Ok(handle) => {
                slot.pending.set(Some(handle));
                true
            }
            Err(e) => {
                warn!("requestAnimationFrame failed for '{canvas_id}': {e:?}");
                false
            }
        }
    }

    fn remove(&self, id: CallbackId) {
        let mut slots = self.slots.borrow_mut();
        let Some(canvas_id) = slots
            .iter()
            .find_map(|(canvas_id, slot)| (slot.id == id).then(|| canvas_id.clone()))
        else {
            return;
        };
        if let Some(slot) = slots.remove(&canvas_id) {
            if let Some(handle) = slot.pending.take() {
                let _ = self.window.cancel_animation_frame(handle);
            }
        }
    }
}

/// An installed DOM listener.
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// Host backed by the browser window.
pub struct WebHost {
    window: Window,
    document: Document,
    listeners: HashMap<CallbackId, Listener>,
    frames: FrameTable,
    next_id: u64,
}

impl std::fmt::Debug for WebHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebHost")
            .field("listeners", &self.listeners.len())
            .field("frame_slots", &self.frames.slots.borrow().len())
            .finish_non_exhaustive()
    }
}

impl WebHost {
    /// Bind to the current window and document.
    pub fn new() -> Result<Self, StartupError> {
        let window = web_sys::window()
            .ok_or_else(|| StartupError::HostUnavailable("no window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| StartupError::HostUnavailable("no document".to_string()))?;
        Ok(Self {
            frames: FrameTable {
                window: window.clone(),
                slots: Rc::new(RefCell::new(HashMap::new())),
            },
            window,
            document,
            listeners: HashMap::new(),
            next_id: 0,
        })
    }

    /// The browser window.
    pub const fn window(&self) -> &Window {
        &self.window
    }

    fn canvas(&self, canvas_id: &str) -> Result<HtmlCanvasElement, StartupError> {
        self.document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| StartupError::CanvasNotFound(canvas_id.to_string()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| StartupError::NotACanvas(canvas_id.to_string()))
    }

    fn next_id(&mut self) -> CallbackId {
        self.next_id += 1;
        CallbackId(self.next_id)
    }

    fn register_frame(
        &mut self,
        canvas_id: &str,
        mut handler: Box<dyn EventHandler>,
    ) -> CallbackId {
        let id = self.next_id();
        let pending = Rc::new(Cell::new(None));
        let flag = Rc::clone(&pending);
        let callback = Closure::new(move |timestamp_ms: f64| {
            flag.set(None);
            handler.handle(&HostEvent::AnimationFrame { timestamp_ms });
        });
        let replaced = self.frames.slots.borrow_mut().insert(
            canvas_id.to_string(),
            FrameSlot {
                id,
                pending,
                callback,
            },
        );
        if let Some(old) = replaced {
            if let Some(handle) = old.pending.take() {
                let _ = self.window.cancel_animation_frame(handle);
            }
        }
        id
    }

    fn register_listener(
        &mut self,
        canvas_id: &str,
        source: EventSource,
        binding: DomBinding,
        mut handler: Box<dyn EventHandler>,
    ) -> Result<CallbackId, StartupError> {
        let registration_error = |reason: String| StartupError::Registration {
            event: source,
            reason,
        };
        let canvas = self
            .canvas(canvas_id)
            .map_err(|e| registration_error(e.to_string()))?;
        let target: EventTarget = match binding.target {
            ListenTarget::Canvas => canvas.clone().into(),
            ListenTarget::Window => self.window.clone().into(),
        };

        let frames = self.frames.clone();
        let frame_canvas = canvas_id.to_string();
        let callback = Closure::new(move |event: Event| {
            let Some(input) = to_input(source, &event, &canvas) else {
                return;
            };
            let response = handler.handle(&HostEvent::Input(input));
            if response.consumed() {
                event.prevent_default();
            }
            if response == HandlerResponse::RequestFrame && !frames.request(&frame_canvas) {
                handler.frame_refused();
            }
        });

        let options = AddEventListenerOptions::new();
        // Wheel and key defaults (page scroll) must stay cancelable.
        options.set_passive(false);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                binding.event,
                callback.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(|e| registration_error(format!("{e:?}")))?;

        let id = self.next_id();
        self.listeners.insert(
            id,
            Listener {
                target,
                event: binding.event,
                callback,
            },
        );
        Ok(id)
    }
}

impl Host for WebHost {
    type Surface = Canvas2DSurface;

    fn resolve_surface(&mut self, canvas_id: &str) -> Result<Self::Surface, StartupError> {
        let canvas = self.canvas(canvas_id)?;
        if fit_to_client(&canvas).is_none() {
            debug!("Canvas '{canvas_id}' has no layout box, keeping its attribute size");
        }
        Canvas2DSurface::new(canvas)
    }

    fn register(
        &mut self,
        canvas_id: &str,
        source: EventSource,
        handler: Box<dyn EventHandler>,
    ) -> Result<CallbackId, StartupError> {
        match DomBinding::for_source(source) {
            Some(binding) => self.register_listener(canvas_id, source, binding, handler),
            None => Ok(self.register_frame(canvas_id, handler)),
        }
    }

    fn deregister(&mut self, id: CallbackId) {
        if let Some(listener) = self.listeners.remove(&id) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.event,
                listener.callback.as_ref().unchecked_ref(),
            );
            return;
        }
        self.frames.remove(id);
    }

    fn request_frame(&mut self, canvas_id: &str) -> bool {
        self.frames.request(canvas_id)
    }
}
