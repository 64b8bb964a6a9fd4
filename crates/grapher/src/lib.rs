//! Grapher: plot formulas of `x` on an HTML canvas, with pan and zoom.
//!
//! The engine lives in [`grapher_core`]; this crate binds it to the browser.
//!
//! # Browser Usage (WASM)
//!
//! ```javascript
//! import init, { start_web, set_function, add_function } from './grapher.js';
//!
//! async function main() {
//!     await init();
//!     await start_web('plot');
//!     set_function('plot', 0, 'sin(x)/x');
//!     add_function('plot', 'x^2/10');
//! }
//! ```

pub mod browser;
mod error;

pub use error::ControlError;
pub use grapher_core as core;

#[cfg(target_arch = "wasm32")]
pub use browser::{
    add_function, init, remove_function, reset_view, set_function, set_visible, start_web,
    start_web_with_config, stop_web, Canvas2DSurface, WebHost,
};
pub use browser::{DomBinding, ListenTarget, SessionRegistry};
