//! WASM application entry points.
//!
//! Sessions live in a thread-local registry keyed by canvas id, which keeps
//! their listeners alive and lets the host page reach them by id.

use super::canvas2d::Canvas2DSurface;
use super::host::WebHost;
use super::location::{read_fragment, write_fragment};
use super::registry::SessionRegistry;
use crate::error::ControlError;
use grapher_core::{GrapherConfig, Session, SessionHandle, StartupError};
use log::info;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

/// Browser state shared by every session on the page.
struct WebRuntime {
    host: WebHost,
    sessions: SessionRegistry<SessionHandle<Canvas2DSurface>>,
}

impl WebRuntime {
    fn start(&mut self, canvas_id: &str, config: GrapherConfig) -> Result<(), StartupError> {
        self.sessions.ensure_vacant(canvas_id)?;
        let sync_url = config.sync_url;
        let fragment = if sync_url {
            read_fragment(self.host.window())
        } else {
            None
        };

        let handle = SessionHandle::start(&mut self.host, canvas_id, config, fragment.as_deref())?;
        if sync_url {
            write_fragment(self.host.window(), &handle.session().share_fragment());
        }
        self.sessions.insert(canvas_id, handle)
    }

    /// Run `f` on the session bound to `canvas_id`, then refresh the share
    /// link if the session mirrors it.
    fn control<R>(
        &mut self,
        canvas_id: &str,
        f: impl FnOnce(&mut Session<Canvas2DSurface>) -> R,
    ) -> Result<R, ControlError> {
        let handle = self.sessions.get(canvas_id)?;
        let result = handle.update(&mut self.host, f);
        let session = handle.session();
        if session.config().sync_url {
            write_fragment(self.host.window(), &session.share_fragment());
        }
        Ok(result)
    }

    fn stop(&mut self, canvas_id: &str) -> bool {
        match self.sessions.remove(canvas_id) {
            Some(handle) => {
                handle.shutdown(&mut self.host);
                true
            }
            None => false,
        }
    }
}

thread_local! {
    static RUNTIME: RefCell<Option<WebRuntime>> = const { RefCell::new(None) };
}

fn with_runtime<R>(
    f: impl FnOnce(&mut WebRuntime) -> Result<R, ControlError>,
) -> Result<R, ControlError> {
    RUNTIME.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(WebRuntime {
                host: WebHost::new()?,
                sessions: SessionRegistry::new(),
            });
        }
        match slot.as_mut() {
            Some(runtime) => f(runtime),
            None => {
                let err = StartupError::HostUnavailable("runtime not initialised".to_string());
                Err(err.into())
            }
        }
    })
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn start(canvas_id: &str, config: GrapherConfig) -> Result<(), JsValue> {
    with_runtime(|runtime| Ok(runtime.start(canvas_id, config)?)).map_err(to_js)
}

/// Install the panic hook and route `log` output to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // Already set when a second module instance shares the page.
    let _ = console_log::init_with_level(log::Level::Debug);
    info!("grapher {} loaded", env!("CARGO_PKG_VERSION"));
}

/// Start a grapher on the canvas with id `canvas_id`, with default settings.
///
/// The promise rejects with the startup error message.
#[wasm_bindgen]
#[allow(clippy::unused_async)]
pub async fn start_web(canvas_id: String) -> Result<(), JsValue> {
    start(&canvas_id, GrapherConfig::default())
}

/// Start a grapher with a JSON configuration; missing fields use defaults.
#[wasm_bindgen]
#[allow(clippy::unused_async)]
pub async fn start_web_with_config(canvas_id: String, config_json: String) -> Result<(), JsValue> {
    let config = GrapherConfig::from_json(&config_json)
        .map_err(|e| to_js(StartupError::Config(e)))?;
    start(&canvas_id, config)
}

/// Replace formula `index`.
///
/// Throws if the formula does not parse; the previous curve stays and the
/// error is shown on the canvas.
#[wasm_bindgen]
pub fn set_function(canvas_id: &str, index: usize, text: &str) -> Result<(), JsValue> {
    with_runtime(|runtime| {
        runtime
            .control(canvas_id, |s| s.set_function(index, text))?
            .map_err(ControlError::from)
    })
    .map_err(to_js)
}

/// Append a formula; returns its index.
#[wasm_bindgen]
pub fn add_function(canvas_id: &str, text: &str) -> Result<usize, JsValue> {
    with_runtime(|runtime| {
        runtime
            .control(canvas_id, |s| s.add_function(text))?
            .map_err(ControlError::from)
    })
    .map_err(to_js)
}

/// Remove the last formula; the first one is never removed.
#[wasm_bindgen]
pub fn remove_function(canvas_id: &str) -> Result<bool, JsValue> {
    with_runtime(|runtime| runtime.control(canvas_id, Session::remove_function)).map_err(to_js)
}

/// Show or hide formula `index`.
#[wasm_bindgen]
pub fn set_visible(canvas_id: &str, index: usize, visible: bool) -> Result<(), JsValue> {
    with_runtime(|runtime| {
        runtime
            .control(canvas_id, |s| s.set_visible(index, visible))?
            .map_err(ControlError::from)
    })
    .map_err(to_js)
}

/// Return to the initial view.
#[wasm_bindgen]
pub fn reset_view(canvas_id: &str) -> Result<bool, JsValue> {
    with_runtime(|runtime| runtime.control(canvas_id, Session::reset_view)).map_err(to_js)
}

/// Stop the grapher on `canvas_id` and remove its listeners.
///
/// Returns whether one was running.
#[wasm_bindgen]
pub fn stop_web(canvas_id: &str) -> bool {
    with_runtime(|runtime| Ok(runtime.stop(canvas_id))).unwrap_or(false)
}
